/// Crate-level error types for codecite resolution.
use std::path::PathBuf;

/// All errors in codecite carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the page, tag, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A local documentation page named by an inventory entry does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing HTML page.
        path: PathBuf,
    },

    /// A resolved inventory entry points at a page that has no matching fragment.
    /// This is an inventory/page mismatch, not a missing symbol.
    #[error("no fragment with id `{tag}` in {page}")]
    FragmentNotFound {
        /// Page that was scraped for the fragment.
        page: String,
        /// Fragment identifier that was expected on the page.
        tag: String,
    },

    /// The blocking HTTP client could not be constructed.
    #[error("http client: {reason}")]
    HttpClient {
        /// Description of the construction failure.
        reason: String,
    },

    /// An inventory file exists but cannot be parsed.
    #[error("inventory corrupt: {path}: {reason}")]
    InventoryCorrupt {
        /// Location of the unparsable inventory file.
        path: String,
        /// Description of the parse failure.
        reason: String,
    },

    /// A configured project root has no inventory file.
    #[error("inventory not found: {}", path.display())]
    InventoryNotFound {
        /// Path where the inventory file was expected.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// A reference target matched neither accepted syntax.
    #[error(
        "malformed reference: `{text}`. Text must match one of these patterns: `{}`, `{}`",
        crate::reference::PLAIN_PATTERN,
        crate::reference::LABELED_PATTERN
    )]
    MalformedReference {
        /// The raw reference text that failed to parse.
        text: String,
    },

    /// Both resolution strategies came up empty for this reference.
    #[error(
        "no source found for `{tag}` / `{namespace}`. \
         Make sure a project root indexes it or a registered package contains it"
    )]
    NoMatchFound {
        /// The namespace that could not be resolved.
        namespace: String,
        /// The tag the user requested.
        tag: String,
    },

    /// Tree-sitter failed to parse a source file.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// An inventory URI does not start with any configured project root.
    #[error("url `{url}` isn't in any of the available projects: {}", roots.join(", "))]
    ProjectRootNotFound {
        /// The configured project roots, sorted.
        roots: Vec<String>,
        /// The inventory URI that matched no root.
        url: String,
    },

    /// The namespace resolved to an imported binding with no source of its own.
    #[error("`{namespace}` has no retrievable source (imported binding)")]
    SourceUnavailable {
        /// The namespace whose source could not be read.
        namespace: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A specific namespace was requested and no indexed project lists it.
    #[error("namespace `{namespace}` was invalid. Options were: {}", options.join(", "))]
    UnknownNamespace {
        /// Namespace that was not found.
        namespace: String,
        /// Known namespaces under the tag that was searched, sorted.
        options: Vec<String>,
    },

    /// A specific tag was requested and no indexed project lists it.
    #[error("tag `{tag}` was invalid. Options were: {}", options.join(", "))]
    UnknownTag {
        /// Known tags across all indexed projects, sorted.
        options: Vec<String>,
        /// Tag that was not found.
        tag: String,
    },

    /// A documentation page or remote inventory could not be fetched.
    #[error("url unreachable: {url}: {reason}")]
    UrlUnreachable {
        /// Description of the transport failure.
        reason: String,
        /// The URL that could not be read.
        url: String,
    },
}
