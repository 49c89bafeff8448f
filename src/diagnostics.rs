use std::fmt::Write as _;

use crate::config::CONFIG_FILE_NAME;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::MalformedReference { text } => render_malformed_reference(text),
        Error::UnknownTag { tag, options } => render_unknown_tag(tag, options),
        Error::UnknownNamespace { namespace, options } => {
            render_unknown_namespace(namespace, options)
        },
        Error::NoMatchFound { tag, namespace } => render_no_match(tag, namespace),
        Error::FragmentNotFound { page, tag } => render_fragment_not_found(page, tag),
        Error::ProjectRootNotFound { url, roots } => render_root_not_found(url, roots),
        Error::InventoryNotFound { path } => render_inventory_not_found(&path.display().to_string()),
        _ => render_generic(e),
    }
}

fn render_generic(e: &Error) -> String {
    match e {
        Error::FileNotFound { path } => format!("\
# Error: Page Not Found

`{}` does not exist. The inventory points at a rendered-source page that
was never written.

## Fix

Re-run the indexing pass for the project that owns the page.
", path.display()),

        Error::UrlUnreachable { url, reason } => format!("\
# Error: Url Unreachable

`{url}` could not be read: {reason}
"),

        Error::InventoryCorrupt { path, reason } => format!("\
# Error: Inventory Corrupt

Could not parse `{path}`: {reason}

## Fix

Regenerate the project's inventory with its indexing pass.
"),

        Error::SourceUnavailable { namespace } => format!("\
# Error: No Source Available

`{namespace}` resolves to an imported binding; its source lives in
another package.
"),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::HttpClient { reason } => format!("\
# Error: HTTP Client

{reason}
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    }
}

fn render_malformed_reference(text: &str) -> String {
    format!(
        "\
# Error: Malformed Reference

`{text}` is not a valid reference target.

## Accepted syntaxes

    :tag:`pkg.mod.name`
    :tag:`Display label <pkg.mod.name>`
"
    )
}

fn render_unknown_tag(tag: &str, options: &[String]) -> String {
    let mut out = format!(
        "\
# Error: Unknown Tag

No indexed project lists the tag `{tag}`.
"
    );

    if !options.is_empty() {
        out.push_str("\n## Known tags\n\n");
        for option in options {
            let _ = writeln!(out, "- `{option}`");
        }
    }

    out
}

fn render_unknown_namespace(namespace: &str, options: &[String]) -> String {
    let mut out = format!(
        "\
# Error: Unknown Namespace

No indexed project lists `{namespace}` under the requested tag.
"
    );

    if !options.is_empty() {
        out.push_str("\n## Known namespaces\n\n");
        for option in options {
            let _ = writeln!(out, "- `{option}`");
        }
    }

    out
}

fn render_no_match(tag: &str, namespace: &str) -> String {
    format!(
        "\
# Error: No Match Found

Neither the registered packages nor the project inventories can resolve
`{tag}` / `{namespace}`.

## Fix

Add the documentation project to `{CONFIG_FILE_NAME}`:

    roots = [\"/path/to/docs/_build\"]

Or register the package sources:

    [packages]
    pkg = \"path/to/pkg\"
"
    )
}

fn render_fragment_not_found(page: &str, tag: &str) -> String {
    format!(
        "\
# Error: Fragment Not Found

`{page}` has no fragment with id `{tag}`, but the inventory says it
should. The index and the rendered pages disagree.

## Fix

Re-run the indexing pass so the pages and inventory match.
"
    )
}

fn render_root_not_found(url: &str, roots: &[String]) -> String {
    let mut out = format!(
        "\
# Error: Project Root Not Found

`{url}` is not inside any configured project root.

## Configured roots

"
    );
    for root in roots {
        let _ = writeln!(out, "- `{root}`");
    }

    out.push_str(&format!(
        "\
\n## Fix

Add the owning project's base location to `roots` in `{CONFIG_FILE_NAME}`.
"
    ));
    out
}

fn render_inventory_not_found(path: &str) -> String {
    format!(
        "\
# Error: Inventory Not Found

`{path}` does not exist. A configured project root has not been indexed.

## Fix

Run the project's indexing pass, or remove the root from
`{CONFIG_FILE_NAME}`.
"
    )
}
