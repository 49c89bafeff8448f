//! Strategy orchestration: find the raw source code for one reference.
//!
//! Two strategies exist, tried in the configured order. A strategy that
//! cleanly determines it doesn't apply returns `Ok(None)` and the other
//! strategy runs. A strategy that engaged and then hit a real
//! inconsistency (unknown tag, unreachable page, missing fragment, ...)
//! errors out immediately; the other strategy must not mask it. Results
//! are never merged; the first hit wins.

use crate::context::Context;
use crate::error::Error;
use crate::imports;
use crate::inventory;
use crate::scrape;
use crate::types::SourceResult;

/// Resolve a reference to its source code.
///
/// `tag` is either a canonical inventory key, the wildcard, or whatever
/// raw tag the user wrote when canonicalization failed; `namespace` is
/// the dotted identifier path.
///
/// # Errors
///
/// Returns `Error::NoMatchFound` when both strategies come up empty, or
/// any hard error a strategy raised while it was engaged.
pub fn get_source(ctx: &Context, tag: &str, namespace: &str) -> Result<SourceResult, Error> {
    let from_packages = || imports::resolve_from_packages(ctx, namespace);
    let from_inventory = || resolve_from_inventory(ctx, tag, namespace);

    let attempts: [&dyn Fn() -> Result<Option<SourceResult>, Error>; 2] =
        if ctx.config().prefer_import {
            [&from_packages, &from_inventory]
        } else {
            [&from_inventory, &from_packages]
        };

    for attempt in attempts {
        if let Some(result) = attempt()? {
            return Ok(result);
        }
    }

    Err(Error::NoMatchFound {
        namespace: namespace.to_string(),
        tag: tag.to_string(),
    })
}

/// Resolve through the merged project inventories and page scraping.
///
/// An empty inventory (no indexed projects yet) is a clean miss; every
/// failure past that point means the build's index and pages disagree
/// with the request and is surfaced as a hard error.
fn resolve_from_inventory(
    ctx: &Context,
    tag: &str,
    namespace: &str,
) -> Result<Option<SourceResult>, Error> {
    let inventory = ctx.inventory()?;
    if inventory.is_empty() {
        return Ok(None);
    }

    let (matched_tag, entry) = inventory::lookup(&inventory, tag, namespace)?;
    let (url, anchor) = entry
        .uri
        .split_once('#')
        .unwrap_or((entry.uri.as_str(), ""));

    let Some(root) = inventory::project_root(url, &ctx.config().roots) else {
        let mut roots = ctx.config().roots.clone();
        roots.sort();
        return Err(Error::ProjectRootNotFound {
            roots,
            url: url.to_string(),
        });
    };

    let location = inventory::module_page(&matched_tag, anchor);
    let page_url = format!("{}/{}", root.trim_end_matches('/'), location.page);
    let code = scrape::extract_source(ctx, &page_url, &location.fragment)?;

    Ok(Some(SourceResult {
        code,
        documentation_link: entry.uri.clone(),
        namespace: namespace.to_string(),
        source_code_link: format!("{page_url}#{}", location.fragment),
    }))
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::Config;
    use crate::inventory::INVENTORY_FILE_NAME;

    const PAGE: &str = concat!(
        "<html><body><div class=\"highlight\">",
        "<pre><span class=\"ch\">#!/usr/bin/env python</span>\n",
        "\n",
        "<div class=\"viewcode-block\" id=\"MyKlass\">",
        "<a class=\"viewcode-back\" href=\"../../api/fake_project.html\">[docs]</a>",
        "<span class=\"k\">class</span> MyKlass:\n",
        "    <span class=\"k\">def</span> get_method(self):\n",
        "        <span class=\"k\">return</span> 8</div>\n",
        "\n",
        "<div class=\"viewcode-block\" id=\"MyKlass.get_method\">",
        "<a class=\"viewcode-back\" href=\"../../api/fake_project.html\">[docs]</a>",
        "    <span class=\"k\">def</span> get_method(self):\n",
        "        <span class=\"k\">return</span> 8</div>\n",
        "</pre></div></body></html>",
    );

    const OBJECTS: &str = r#"{
        "py:class": {
            "fake_project.basic.MyKlass":
                ["fake_project", "", "api/fake_project.html#fake_project.basic.MyKlass", "-"]
        },
        "py:function": {
            "fake_project.basic.set_function_thing":
                ["fake_project", "", "api/fake_project.html#fake_project.basic.set_function_thing", "-"]
        },
        "py:method": {
            "fake_project.basic.MyKlass.get_method":
                ["fake_project", "", "api/fake_project.html#fake_project.basic.MyKlass.get_method", "-"]
        },
        "py:module": {
            "fake_project.basic":
                ["fake_project", "", "api/fake_project.html#module-fake_project.basic", "-"]
        }
    }"#;

    const MODULE: &str = "\
class MyKlass:
    def get_method(self):
        return 8
";

    struct Fixture {
        docs_root: String,
        _dir: tempfile::TempDir,
    }

    /// Build a docs tree (inventory + rendered-source page) and a package
    /// source tree for the same symbols, so both strategies can engage.
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();

        let docs = dir.path().join("docs");
        let modules = docs.join("_modules").join("fake_project");
        std::fs::create_dir_all(&modules).unwrap();
        std::fs::write(docs.join(INVENTORY_FILE_NAME), OBJECTS).unwrap();
        std::fs::write(modules.join("basic.html"), PAGE).unwrap();

        let package = dir.path().join("python").join("fake_project");
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("__init__.py"), "").unwrap();
        std::fs::write(package.join("basic.py"), MODULE).unwrap();

        Fixture {
            docs_root: docs.to_string_lossy().to_string(),
            _dir: dir,
        }
    }

    fn context(fixture: &Fixture, prefer_import: bool) -> Context {
        let package = Path::new(&fixture.docs_root)
            .parent()
            .unwrap()
            .join("python")
            .join("fake_project");

        let mut config = Config {
            prefer_import,
            roots: vec![fixture.docs_root.clone()],
            ..Config::default()
        };
        config.packages.insert(
            "fake_project".to_string(),
            package.to_string_lossy().to_string(),
        );
        Context::new(config).unwrap()
    }

    #[test]
    fn method_resolves_through_the_inventory() {
        let fixture = fixture();
        let ctx = context(&fixture, false);

        let result =
            get_source(&ctx, "py:method", "fake_project.basic.MyKlass.get_method").unwrap();

        assert_eq!(result.code, "    def get_method(self):\n        return 8");
        assert_eq!(result.namespace, "fake_project.basic.MyKlass.get_method");
        assert_eq!(
            result.source_code_link,
            format!(
                "{}/_modules/fake_project/basic.html#MyKlass.get_method",
                fixture.docs_root
            )
        );
        assert_eq!(
            result.documentation_link,
            format!(
                "{}/api/fake_project.html#fake_project.basic.MyKlass.get_method",
                fixture.docs_root
            )
        );
    }

    #[test]
    fn prefer_import_wins_when_both_strategies_match() {
        let fixture = fixture();

        let ctx = context(&fixture, true);
        let result =
            get_source(&ctx, "py:method", "fake_project.basic.MyKlass.get_method").unwrap();
        // Package-source results carry no links.
        assert_eq!(result.source_code_link, "");
        assert_eq!(result.documentation_link, "");

        let ctx = context(&fixture, false);
        let result =
            get_source(&ctx, "py:method", "fake_project.basic.MyKlass.get_method").unwrap();
        assert!(!result.source_code_link.is_empty());
    }

    #[test]
    fn wildcard_resolves_the_module_and_never_leaks_the_wildcard() {
        let fixture = fixture();
        let ctx = context(&fixture, false);

        let result = get_source(&ctx, "obj", "fake_project.basic").unwrap();
        assert!(result.code.starts_with("#!/usr/bin/env python"));
        // A module fragment has no in-page tag.
        assert!(result.source_code_link.ends_with("/_modules/fake_project/basic.html#"));
    }

    #[test]
    fn empty_inventory_falls_through_to_packages() {
        let fixture = fixture();

        let package = Path::new(&fixture.docs_root)
            .parent()
            .unwrap()
            .join("python")
            .join("fake_project");
        let mut config = Config::default();
        config.packages.insert(
            "fake_project".to_string(),
            package.to_string_lossy().to_string(),
        );
        let ctx = Context::new(config).unwrap();

        let result =
            get_source(&ctx, "py:method", "fake_project.basic.MyKlass.get_method").unwrap();
        assert_eq!(result.code, "    def get_method(self):\n        return 8");
        assert_eq!(result.source_code_link, "");
    }

    #[test]
    fn both_strategies_empty_is_no_match() {
        let ctx = Context::new(Config::default()).unwrap();
        let error = get_source(&ctx, "py:method", "pkg.Klass.method").unwrap_err();
        assert!(matches!(error, Error::NoMatchFound { .. }));
    }

    #[test]
    fn unknown_namespace_is_not_masked_by_the_other_strategy() {
        let fixture = fixture();

        // The package tree could answer cleanly for other namespaces, but
        // the inventory engaged on a specific tag and must error out.
        let ctx = context(&fixture, false);
        let error = get_source(&ctx, "py:class", "fake_project.basic.Missing").unwrap_err();
        assert!(matches!(error, Error::UnknownNamespace { .. }));

        let ctx = context(&fixture, true);
        let error = get_source(&ctx, "py:class", "fake_project.basic.Missing").unwrap_err();
        assert!(matches!(error, Error::UnknownNamespace { .. }));
    }

    #[test]
    fn unknown_tag_is_hard_for_specific_requests() {
        let fixture = fixture();
        let ctx = context(&fixture, false);

        let error = get_source(&ctx, "py:exception", "fake_project.basic.MyKlass").unwrap_err();
        assert!(matches!(error, Error::UnknownTag { .. }));
    }

    #[test]
    fn indexed_symbol_missing_from_the_page_is_hard() {
        let fixture = fixture();
        let ctx = context(&fixture, false);

        // The inventory lists the function but the rendered page has no
        // matching fragment: an index/page mismatch, not a fallback case,
        // even though the package tree is still configured.
        let error = get_source(
            &ctx,
            "py:function",
            "fake_project.basic.set_function_thing",
        )
        .unwrap_err();
        assert!(matches!(error, Error::FragmentNotFound { .. }));
    }
}
