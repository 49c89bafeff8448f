mod config;
mod context;
mod diagnostics;
mod error;
mod imports;
mod inventory;
mod reference;
mod scrape;
mod source;
mod types;
mod unindent;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::context::Context;
use crate::error::Error;
use crate::types::SourceResult;

#[derive(Parser)]
#[command(name = "codecite", about = "Cited source excerpts for documentation builds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a reference target and print its source code
    Resolve {
        /// The reference target, e.g. ":func:`pkg.mod.get_thing`"
        target: String,
        /// Text printed instead of code when a downgraded lookup fails
        #[arg(long)]
        fallback: Option<String>,
        /// Print a fenced code block tagged with this language
        #[arg(long)]
        language: Option<String>,
        /// Print the documentation and source links after the code
        #[arg(long)]
        links: bool,
        /// Keep the original indentation of the extracted code
        #[arg(long)]
        no_unindent: bool,
        /// Try the registered package sources before the inventory
        #[arg(long)]
        prefer_import: bool,
        /// Drop comment and docstring spans from scraped fragments
        #[arg(long)]
        strip_comments: bool,
    },
    /// List indexed namespaces, optionally under a single tag
    Inventory {
        /// Canonical tag to filter by, e.g. "py:function"
        #[arg(long)]
        tag: Option<String>,
    },
}

/// Flags for one resolve invocation, bundled to travel together.
struct ResolveOptions {
    fallback: Option<String>,
    language: Option<String>,
    links: bool,
    no_unindent: bool,
    prefer_import: bool,
    strip_comments: bool,
    target: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            target,
            fallback,
            language,
            links,
            no_unindent,
            prefer_import,
            strip_comments,
        } => cmd_resolve(&ResolveOptions {
            fallback,
            language,
            links,
            no_unindent,
            prefer_import,
            strip_comments,
            target,
        }),
        Commands::Inventory { tag } => cmd_inventory(tag.as_deref()),
    }
}

/// Resolve one reference and print the code (or a downgraded warning).
fn cmd_resolve(options: &ResolveOptions) -> ExitCode {
    // An unparsable reference is an authoring mistake: always hard,
    // regardless of the reraise setting.
    let reference = match reference::parse(&options.target) {
        Ok(r) => r,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::FAILURE;
        },
    };

    let mut config = match Config::load(&PathBuf::from(".")) {
        Ok(c) => c,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::FAILURE;
        },
    };
    config.prefer_import = config.prefer_import || options.prefer_import;
    let reraise = config.reraise;

    let mut ctx = match Context::new(config) {
        Ok(c) => c,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::FAILURE;
        },
    };
    if options.strip_comments {
        ctx.set_preprocessor(Box::new(scrape::strip_comment_spans));
    }

    let tag = reference::normalize_tag(&reference.tag)
        .map(|t| t.inventory_key().to_string())
        .unwrap_or_else(|| reference.tag.clone());

    match source::get_source(&ctx, &tag, &reference.namespace) {
        Ok(result) => {
            print_result(&result, options);
            ExitCode::SUCCESS
        },
        Err(e) if !reraise && is_downgradable(&e) => {
            diagnostics::print_error(&e);
            if let Some(fallback) = &options.fallback {
                println!("{fallback}");
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}

/// Dump the merged inventory, optionally filtered to one tag.
fn cmd_inventory(tag: Option<&str>) -> ExitCode {
    let config = match Config::load(&PathBuf::from(".")) {
        Ok(c) => c,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::FAILURE;
        },
    };

    let ctx = match Context::new(config) {
        Ok(c) => c,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::FAILURE;
        },
    };

    let merged = match ctx.inventory() {
        Ok(i) => i,
        Err(e) => {
            diagnostics::print_error(&e);
            return ExitCode::FAILURE;
        },
    };

    if merged.is_empty() {
        println!("No indexed projects.");
        return ExitCode::SUCCESS;
    }

    if let Some(wanted) = tag {
        if !merged.contains_key(wanted) {
            let mut options: Vec<String> = merged.keys().cloned().collect();
            options.sort();
            diagnostics::print_error(&Error::UnknownTag {
                options,
                tag: wanted.to_string(),
            });
            return ExitCode::FAILURE;
        }
    }

    let mut tags: Vec<&String> = merged
        .keys()
        .filter(|key| tag.is_none_or(|wanted| wanted == key.as_str()))
        .collect();
    tags.sort();

    for key in tags {
        let Some(namespaces) = merged.get(key) else {
            continue;
        };
        let mut names: Vec<&String> = namespaces.keys().collect();
        names.sort();
        for name in names {
            let Some(entry) = namespaces.get(name) else {
                continue;
            };
            // The display string defaults to "-", meaning "use the namespace".
            let label = if entry.display == "-" { name } else { &entry.display };
            let mut origin = entry.project.clone();
            if !entry.version.is_empty() {
                origin.push(' ');
                origin.push_str(&entry.version);
            }
            println!("{key} {label} -> {} ({origin})", entry.uri);
        }
    }

    ExitCode::SUCCESS
}

/// The per-reference lookup failures the boundary downgrades to a warning
/// when `reraise` is off. Everything else always fails the build.
fn is_downgradable(e: &Error) -> bool {
    matches!(
        e,
        Error::UnknownTag { .. }
            | Error::UnknownNamespace { .. }
            | Error::FileNotFound { .. }
            | Error::UrlUnreachable { .. }
    )
}

/// Print one resolved result, unindented unless asked otherwise.
fn print_result(result: &SourceResult, options: &ResolveOptions) {
    let code = if options.no_unindent {
        result.code.clone()
    } else {
        unindent::unindent(&result.code)
    };

    if let Some(language) = &options.language {
        println!("```{language}");
        println!("{code}");
        println!("```");
    } else {
        println!("{code}");
    }

    if options.links && !result.source_code_link.is_empty() {
        println!();
        println!("source: {}", result.source_code_link);
        println!("docs:   {}", result.documentation_link);
    }
}
