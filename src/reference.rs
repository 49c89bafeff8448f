//! Reference parsing: the `:tag:`namespace`` target syntax and tag
//! canonicalization against the inventory key table.

use regex::Regex;

use crate::error::Error;
use crate::types::{CanonicalTag, Reference};

/// A plain target: `:tag:`pkg.mod.name``.
pub const PLAIN_PATTERN: &str = r":(?P<tag>[\w:]+):`(?P<namespace>[\w.]+)`";

/// A labeled target: `:tag:`Display label <pkg.mod.name>``.
pub const LABELED_PATTERN: &str =
    r":(?P<tag>[\w:]+):`(?P<label>[\w+._]+)\s+<(?P<namespace>[\w.]+)>`";

/// The wildcard tag. Not canonical itself: it requests a search over every
/// canonical tag in [`CanonicalTag::WILDCARD_SEARCH_ORDER`].
pub const WILDCARD_TAG: &str = "obj";

/// Split a reference target into its tag and namespace.
///
/// # Errors
///
/// Returns `Error::MalformedReference` if the text matches neither
/// accepted pattern.
///
/// # Panics
///
/// Panics if the hardcoded target patterns are invalid (compile-time invariant).
pub fn parse(text: &str) -> Result<Reference, Error> {
    let plain = Regex::new(&format!("^{PLAIN_PATTERN}")).expect("valid regex");
    let labeled = Regex::new(&format!("^{LABELED_PATTERN}")).expect("valid regex");

    let captures = plain
        .captures(text)
        .or_else(|| labeled.captures(text))
        .ok_or_else(|| Error::MalformedReference {
            text: text.to_string(),
        })?;

    let tag = captures.name("tag").map(|m| m.as_str()).unwrap_or("");
    let namespace = captures.name("namespace").map(|m| m.as_str()).unwrap_or("");

    Ok(Reference {
        namespace: namespace.to_string(),
        tag: tag.to_string(),
    })
}

/// Map a user-written short tag to its canonical form.
///
/// The table covers the short tags users actually write in references.
/// Anything else (including the wildcard and already-canonical keys)
/// yields `None` and the raw tag flows through to the inventory lookup,
/// which reports an unknown tag on a miss.
pub fn normalize_tag(tag: &str) -> Option<CanonicalTag> {
    match tag.trim_matches(':') {
        "attr" => Some(CanonicalTag::Attribute),
        "class" => Some(CanonicalTag::Class),
        "func" => Some(CanonicalTag::Function),
        "meth" => Some(CanonicalTag::Method),
        "mod" => Some(CanonicalTag::Module),
        _ => None,
    }
}
