//! Cross-project inventory loading and lookup.
//!
//! Each indexed documentation project publishes an `objects.json` at its
//! root, produced by the indexing pass: a mapping from canonical tag to
//! namespace to a `(project, version, uri, display)` entry. The core only
//! ever reads inventories. Loading happens once per build and is memoized
//! by the [`Context`](crate::context::Context).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::context::Context;
use crate::error::Error;
use crate::reference::WILDCARD_TAG;
use crate::types::CanonicalTag;

/// File name the indexing pass writes at each project root.
pub const INVENTORY_FILE_NAME: &str = "objects.json";

/// One indexed symbol: which project documents it and where.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawInventoryEntry")]
pub struct InventoryEntry {
    /// Display string for cross-reference rendering; `-` when unset.
    pub display: String,
    /// Name of the project that indexed the symbol.
    pub project: String,
    /// Location of the documentation page, `<page>#<anchor>`.
    /// Absolutized against the owning root at load time.
    pub uri: String,
    /// Project version, or blank.
    pub version: String,
}

/// The on-disk array form of one entry: `[project, version, uri, display]`.
#[derive(Deserialize)]
struct RawInventoryEntry(String, String, String, String);

impl From<RawInventoryEntry> for InventoryEntry {
    fn from(raw: RawInventoryEntry) -> Self {
        Self {
            display: raw.3,
            project: raw.0,
            uri: raw.2,
            version: raw.1,
        }
    }
}

/// Canonical tag key to namespace to entry, merged across every root.
pub type Inventory = HashMap<String, HashMap<String, InventoryEntry>>;

/// Page location computed from one inventory hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// In-page fragment identifier, e.g. `MyKlass.get_method`.
    /// Empty when the reference targets a whole module.
    pub fragment: String,
    /// Project-relative path of the rendered-source page.
    pub page: String,
}

/// Load and merge the inventories of every configured root, in order.
/// Earlier roots win when two projects index the same namespace.
///
/// # Errors
///
/// Returns `Error::InventoryNotFound` if a local root has no inventory
/// file, `Error::UrlUnreachable` if a remote root cannot be fetched, or
/// `Error::InventoryCorrupt` if an inventory file does not parse.
pub fn load_all(ctx: &Context) -> Result<Inventory, Error> {
    let mut merged = Inventory::new();

    for root in &ctx.config().roots {
        let loaded = load_project(ctx, root)?;
        merge(&mut merged, loaded);
    }

    Ok(merged)
}

/// Load one project's inventory and absolutize its URIs against the root.
fn load_project(ctx: &Context, root: &str) -> Result<Inventory, Error> {
    let location = format!("{}/{INVENTORY_FILE_NAME}", root.trim_end_matches('/'));

    let contents = if Path::new(root).is_absolute() {
        let path = Path::new(&location);
        if !path.is_file() {
            return Err(Error::InventoryNotFound {
                path: path.to_path_buf(),
            });
        }
        std::fs::read_to_string(path)?
    } else {
        ctx.fetch(&location)?
    };

    let parsed: Inventory =
        serde_json::from_str(&contents).map_err(|e| Error::InventoryCorrupt {
            path: location,
            reason: e.to_string(),
        })?;

    Ok(absolutize(parsed, root))
}

/// Join page-relative entry URIs onto the owning root. URIs that are
/// already URLs or absolute paths pass through untouched.
fn absolutize(inventory: Inventory, root: &str) -> Inventory {
    let base = root.trim_end_matches('/');

    inventory
        .into_iter()
        .map(|(tag, namespaces)| {
            let namespaces = namespaces
                .into_iter()
                .map(|(namespace, mut entry)| {
                    if !is_absolute_location(&entry.uri) {
                        entry.uri = format!("{base}/{}", entry.uri);
                    }
                    (namespace, entry)
                })
                .collect();
            (tag, namespaces)
        })
        .collect()
}

/// Check whether a location already names its project on its own.
fn is_absolute_location(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://") || Path::new(uri).is_absolute()
}

/// Fold one project's inventory into the merged view without overwriting.
fn merge(merged: &mut Inventory, incoming: Inventory) {
    for (tag, namespaces) in incoming {
        let slot = merged.entry(tag).or_default();
        for (namespace, entry) in namespaces {
            slot.entry(namespace).or_insert(entry);
        }
    }
}

/// Find the inventory entry for a tag and namespace.
///
/// A wildcard tag probes every canonical tag in
/// [`CanonicalTag::WILDCARD_SEARCH_ORDER`] and returns the first hit; a
/// miss on one candidate just moves to the next. A specific tag is a
/// single-candidate search where any miss is a hard error. The returned
/// tag is always the concrete candidate that matched, never the wildcard.
///
/// # Errors
///
/// Returns `Error::UnknownTag` or `Error::UnknownNamespace` for a miss on
/// a specific tag, or `Error::UnknownNamespace` when a wildcard search
/// exhausts every candidate.
pub fn lookup<'i>(
    inventory: &'i Inventory,
    tag: &str,
    namespace: &str,
) -> Result<(String, &'i InventoryEntry), Error> {
    let wildcard = tag == WILDCARD_TAG;
    let candidates: Vec<String> = if wildcard {
        CanonicalTag::WILDCARD_SEARCH_ORDER
            .iter()
            .map(|t| t.inventory_key().to_string())
            .collect()
    } else {
        vec![tag.to_string()]
    };

    for candidate in candidates {
        let Some(namespaces) = inventory.get(&candidate) else {
            if wildcard {
                continue;
            }
            return Err(Error::UnknownTag {
                options: sorted_keys(inventory),
                tag: candidate,
            });
        };

        let Some(entry) = namespaces.get(namespace) else {
            if wildcard {
                continue;
            }
            return Err(Error::UnknownNamespace {
                namespace: namespace.to_string(),
                options: sorted_keys(namespaces),
            });
        };

        return Ok((candidate, entry));
    }

    Err(Error::UnknownNamespace {
        namespace: namespace.to_string(),
        options: Vec::new(),
    })
}

/// Compute the rendered-source page path and in-page fragment id for one
/// inventory hit. The anchor encodes the dotted namespace; a method keeps
/// its last two segments as the fragment (`Class.method`), a module keeps
/// none (the whole page is the fragment), everything else keeps one.
pub fn module_page(tag: &str, anchor: &str) -> PageLocation {
    let anchor = anchor.strip_prefix("module-").unwrap_or(anchor);
    let segments: Vec<&str> = anchor.split('.').collect();

    let consumed = match CanonicalTag::from_inventory_key(tag) {
        Some(CanonicalTag::Module) => 0,
        Some(CanonicalTag::Method) => 2,
        _ => 1,
    };

    let (base, tail) = segments.split_at(segments.len().saturating_sub(consumed));
    PageLocation {
        fragment: tail.join("."),
        page: format!("_modules/{}.html", base.join("/")),
    }
}

/// Find the configured root that a page URL belongs to.
pub fn project_root<'r>(url: &str, roots: &'r [String]) -> Option<&'r str> {
    roots
        .iter()
        .map(String::as_str)
        .find(|root| url.starts_with(root))
}

/// Sorted key listing for error reporting.
fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}
