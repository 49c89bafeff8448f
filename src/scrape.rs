//! Documentation-page fetching and source-fragment extraction.
//!
//! Pages follow the rendered-source conventions of the indexing tool:
//! every navigation link back to the API docs carries the
//! `viewcode-back` class (always removed), a whole-module listing starts
//! at the first `span.ch` token, and each symbol's listing lives in a
//! `div` whose id is the dotted fragment identifier.

use std::path::Path;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::context::Context;
use crate::error::Error;

/// Navigation links injected next to each rendered source block.
const BACK_REFERENCE_SELECTOR: &str = "a.viewcode-back";

/// The token class that opens every rendered module listing.
const MODULE_START_SELECTOR: &str = "span.ch";

/// Comment and docstring token classes, for the built-in preprocessor.
const COMMENT_SPAN_SELECTOR: &str = "span.c1, span.sd";

/// Fetch a page and extract the raw text of one tagged fragment.
///
/// An empty `tag` means the reference targets the whole module: the first
/// rendered-source marker's parent container is extracted and leading
/// whitespace dropped (module source is already at column zero).
///
/// # Errors
///
/// Returns `Error::FileNotFound` for a missing local page,
/// `Error::UrlUnreachable` for a failed fetch, or
/// `Error::FragmentNotFound` if the page has no matching fragment.
pub fn extract_source(ctx: &Context, page: &str, tag: &str) -> Result<String, Error> {
    let contents = read_page(ctx, page)?;
    extract_fragment_text(ctx, &contents, page, tag)
}

/// Read a page from disk (absolute paths) or over the network.
fn read_page(ctx: &Context, page: &str) -> Result<String, Error> {
    let path = Path::new(page);
    if !path.is_absolute() {
        return ctx.fetch(page);
    }

    if !path.is_file() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(std::fs::read_to_string(path)?)
}

/// Parse page contents and pull out the requested fragment's text.
///
/// # Panics
///
/// Panics if the hardcoded selectors are invalid (compile-time invariant).
fn extract_fragment_text(
    ctx: &Context,
    contents: &str,
    page: &str,
    tag: &str,
) -> Result<String, Error> {
    let mut html = Html::parse_document(contents);

    let back_references = Selector::parse(BACK_REFERENCE_SELECTOR).expect("valid selector");
    detach_all(&mut html, &back_references);

    let fragment = if tag.is_empty() {
        find_module_fragment(&html)
    } else {
        find_tagged_fragment(&html, tag)
    };

    let Some(fragment) = fragment else {
        return Err(Error::FragmentNotFound {
            page: page.to_string(),
            tag: tag.to_string(),
        });
    };

    if let Some(preprocessor) = ctx.preprocessor() {
        preprocessor(&mut html, fragment);
    }

    let text = fragment_text(&html, fragment).ok_or_else(|| Error::FragmentNotFound {
        page: page.to_string(),
        tag: tag.to_string(),
    })?;

    if tag.is_empty() {
        Ok(text.trim_start().to_string())
    } else {
        Ok(text)
    }
}

/// The parent container of the first rendered-source marker.
fn find_module_fragment(html: &Html) -> Option<NodeId> {
    let marker = Selector::parse(MODULE_START_SELECTOR).expect("valid selector");
    let first = html.select(&marker).next()?;
    first.parent().map(|parent| parent.id())
}

/// The container whose id attribute equals the fragment identifier.
fn find_tagged_fragment(html: &Html, tag: &str) -> Option<NodeId> {
    let containers = Selector::parse("div[id]").expect("valid selector");
    html.select(&containers)
        .find(|el| el.value().attr("id") == Some(tag))
        .map(|el| el.id())
}

/// Concatenated text of every text node under the fragment.
fn fragment_text(html: &Html, fragment: NodeId) -> Option<String> {
    let node = html.tree.get(fragment)?;
    let element = ElementRef::wrap(node)?;
    Some(element.text().collect())
}

/// Detach every element matching the selector from the document.
fn detach_all(html: &mut Html, selector: &Selector) {
    let ids: Vec<NodeId> = html.select(selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Built-in preprocessor: drop comment and docstring tokens from the
/// fragment so only executable source remains.
///
/// # Panics
///
/// Panics if the hardcoded selector is invalid (compile-time invariant).
pub fn strip_comment_spans(html: &mut Html, fragment: NodeId) {
    let spans = Selector::parse(COMMENT_SPAN_SELECTOR).expect("valid selector");
    let ids: Vec<NodeId> = html
        .select(&spans)
        .filter(|el| el.ancestors().any(|ancestor| ancestor.id() == fragment))
        .map(|el| el.id())
        .collect();

    for id in ids {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }
}
