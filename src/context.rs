//! Build-scoped state threaded through every resolver call.
//!
//! One [`Context`] is constructed per documentation build (or CLI
//! invocation) and dropped with it. It owns the configuration, the HTTP
//! client, the optional page preprocessor, and the memoized inventory,
//! so no resolver ever reaches for process-wide state.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use ego_tree::NodeId;
use scraper::Html;

use crate::config::Config;
use crate::error::Error;
use crate::inventory::{self, Inventory};

/// A hook that may rewrite a parsed page fragment before text extraction.
/// Receives the whole document and the fragment's node id, after
/// back-reference removal. Mutating anything outside the fragment is
/// allowed but pointless; only the fragment's text is extracted.
pub type Preprocessor = Box<dyn Fn(&mut Html, NodeId)>;

/// Shared read-only state for one build.
pub struct Context {
    client: reqwest::blocking::Client,
    config: Config,
    inventory: RefCell<Option<Rc<Inventory>>>,
    preprocessor: Option<Preprocessor>,
}

impl Context {
    /// Create a context from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::HttpClient` if the blocking client cannot be built.
    pub fn new(config: Config) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::HttpClient {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            config,
            inventory: RefCell::new(None),
            preprocessor: None,
        })
    }

    /// The build configuration this context was created from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch a remote resource as text.
    ///
    /// A single attempt with the configured timeout; retry policy belongs
    /// to the host build system, not here.
    ///
    /// # Errors
    ///
    /// Returns `Error::UrlUnreachable` on any transport failure or
    /// non-success status.
    pub fn fetch(&self, url: &str) -> Result<String, Error> {
        let unreachable = |reason: String| Error::UrlUnreachable {
            reason,
            url: url.to_string(),
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unreachable(format!("status {}", response.status())));
        }

        response.text().map_err(|e| unreachable(e.to_string()))
    }

    /// The merged inventory of every configured root.
    ///
    /// Loaded on first use and cached for the lifetime of the build;
    /// repeated calls return the same parsed view without re-reading.
    ///
    /// # Errors
    ///
    /// Returns inventory loading errors from [`inventory::load_all`].
    pub fn inventory(&self) -> Result<Rc<Inventory>, Error> {
        if let Some(cached) = self.inventory.borrow().as_ref() {
            return Ok(Rc::clone(cached));
        }

        let built = Rc::new(inventory::load_all(self)?);
        *self.inventory.borrow_mut() = Some(Rc::clone(&built));
        Ok(built)
    }

    /// The optional page preprocessor, if one was installed.
    pub fn preprocessor(&self) -> Option<&Preprocessor> {
        self.preprocessor.as_ref()
    }

    /// Install a page preprocessor. Its presence changes nothing but the
    /// fragment text it chooses to rewrite.
    pub fn set_preprocessor(&mut self, hook: Preprocessor) {
        self.preprocessor = Some(hook);
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::inventory::INVENTORY_FILE_NAME;

    fn context_with_roots(roots: Vec<String>) -> Context {
        let config = Config {
            roots,
            ..Config::default()
        };
        Context::new(config).unwrap()
    }

    #[test]
    fn no_roots_means_empty_inventory() {
        let ctx = context_with_roots(Vec::new());
        assert!(ctx.inventory().unwrap().is_empty());
    }

    #[test]
    fn local_inventory_loads_and_absolutizes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(INVENTORY_FILE_NAME),
            r#"{"py:function": {"pkg.fn": ["pkg", "", "api/pkg.html#pkg.fn", "-"]}}"#,
        )
        .unwrap();

        let root = dir.path().to_string_lossy().to_string();
        let ctx = context_with_roots(vec![root.clone()]);

        let inventory = ctx.inventory().unwrap();
        let entry = inventory
            .get("py:function")
            .and_then(|n| n.get("pkg.fn"))
            .unwrap();
        assert_eq!(entry.uri, format!("{root}/api/pkg.html#pkg.fn"));
    }

    #[test]
    fn inventory_is_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(INVENTORY_FILE_NAME),
            r#"{"py:function": {"pkg.fn": ["pkg", "", "api/pkg.html#pkg.fn", "-"]}}"#,
        )
        .unwrap();

        let ctx = context_with_roots(vec![dir.path().to_string_lossy().to_string()]);
        let first = ctx.inventory().unwrap();

        // Corrupt the file on disk; the cached view must survive.
        std::fs::write(dir.path().join(INVENTORY_FILE_NAME), "{").unwrap();
        let second = ctx.inventory().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_local_inventory_is_hard() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_with_roots(vec![dir.path().to_string_lossy().to_string()]);
        assert!(matches!(
            ctx.inventory(),
            Err(Error::InventoryNotFound { .. })
        ));
    }

    #[test]
    fn corrupt_local_inventory_is_hard() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INVENTORY_FILE_NAME), "not json").unwrap();

        let ctx = context_with_roots(vec![dir.path().to_string_lossy().to_string()]);
        assert!(matches!(
            ctx.inventory(),
            Err(Error::InventoryCorrupt { .. })
        ));
    }
}
