//! Source resolution against registered package trees.
//!
//! The analog of importing a namespace and reading its source off the
//! live object: the configuration registers each top-level package's
//! source directory, the longest importable module prefix is located on
//! disk, and the remaining namespace segments are walked through the
//! parsed module as nested declarations. Results carry no links; code
//! resolved straight from a source tree has no browsable location.

use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node, Parser, Tree};

use crate::context::Context;
use crate::error::Error;
use crate::types::SourceResult;

/// What one namespace segment resolved to inside a module.
enum Member<'t> {
    /// A class, function, or assignment declared in this scope.
    Definition(Node<'t>),
    /// A name bound by an import statement; its source lives elsewhere.
    Imported,
}

/// Resolve a dotted namespace against the registered package sources.
///
/// Returns `Ok(None)` when the namespace simply isn't reachable this way
/// (unregistered package, no module file, missing declaration); the
/// caller falls through to the other strategy.
///
/// # Errors
///
/// Returns `Error::SourceUnavailable` if the namespace names an import
/// binding, `Error::ParseFailed` if a module does not parse, or
/// `Error::Io` if a located module cannot be read.
pub fn resolve_from_packages(
    ctx: &Context,
    namespace: &str,
) -> Result<Option<SourceResult>, Error> {
    let segments: Vec<&str> = namespace.split('.').collect();
    let Some(top) = segments.first() else {
        return Ok(None);
    };
    let Some(package_dir) = ctx.config().packages.get(*top) else {
        return Ok(None);
    };

    let Some((file, consumed)) = find_module_file(Path::new(package_dir), &segments) else {
        return Ok(None);
    };

    let source = std::fs::read_to_string(&file)?;
    let suffix = &segments[consumed..];

    // The namespace is the module itself; no declaration walk needed.
    if suffix.is_empty() {
        return Ok(Some(source_result(source, namespace)));
    }

    let tree = parse_python(&file, &source)?;
    let Some(node) = walk_declarations(&tree, &source, suffix, namespace)? else {
        return Ok(None);
    };

    let code = full_line_text(&source, node.start_byte(), node.end_byte());
    Ok(Some(source_result(code, namespace)))
}

/// Find the deepest module file the namespace prefix maps onto, trying
/// one fewer trailing segment each round. Returns the file and how many
/// segments the module path consumed.
fn find_module_file(package_dir: &Path, segments: &[&str]) -> Option<(PathBuf, usize)> {
    for consumed in (1..=segments.len()).rev() {
        let relative: PathBuf = segments[1..consumed].iter().collect();
        let dir = package_dir.join(&relative);

        let package_marker = dir.join("__init__.py");
        if package_marker.is_file() {
            return Some((package_marker, consumed));
        }

        if consumed > 1 {
            let module = dir.with_extension("py");
            if module.is_file() {
                return Some((module, consumed));
            }
        }
    }

    None
}

/// Walk the unconsumed namespace segments through the module tree as
/// nested declarations. `Ok(None)` means a segment didn't resolve.
fn walk_declarations<'t>(
    tree: &'t Tree,
    source: &str,
    suffix: &[&str],
    namespace: &str,
) -> Result<Option<Node<'t>>, Error> {
    let mut scope = tree.root_node();
    let mut resolved = None;

    for (index, segment) in suffix.iter().enumerate() {
        match find_member(scope, source, segment) {
            None => return Ok(None),
            Some(Member::Imported) => {
                return Err(Error::SourceUnavailable {
                    namespace: namespace.to_string(),
                });
            },
            Some(Member::Definition(node)) => {
                if index + 1 < suffix.len() {
                    // Only classes have members of their own.
                    let Some(body) = class_body(node) else {
                        return Ok(None);
                    };
                    scope = body;
                }
                resolved = Some(node);
            },
        }
    }

    Ok(resolved)
}

/// Find a declaration named `name` directly inside a module or class body.
fn find_member<'t>(scope: Node<'t>, source: &str, name: &str) -> Option<Member<'t>> {
    let mut cursor = scope.walk();

    for child in scope.children(&mut cursor) {
        match child.kind() {
            "function_definition" | "class_definition" => {
                if definition_name(child, source) == Some(name) {
                    return Some(Member::Definition(child));
                }
            },
            "decorated_definition" => {
                let inner = child.child_by_field_name("definition");
                if inner.is_some_and(|n| definition_name(n, source) == Some(name)) {
                    // Keep the wrapper so decorators stay in the extract.
                    return Some(Member::Definition(child));
                }
            },
            "expression_statement" => {
                if assignment_target(child, source) == Some(name) {
                    return Some(Member::Definition(child));
                }
            },
            "import_statement" | "import_from_statement" => {
                if import_binds(child, source, name) {
                    return Some(Member::Imported);
                }
            },
            _ => {},
        }
    }

    None
}

/// The name field of a class or function definition.
fn definition_name<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    let name = node.child_by_field_name("name")?;
    name.utf8_text(source.as_bytes()).ok()
}

/// The target identifier of a simple `name = value` statement.
fn assignment_target<'s>(statement: Node<'_>, source: &'s str) -> Option<&'s str> {
    let assignment = statement.named_child(0)?;
    if assignment.kind() != "assignment" {
        return None;
    }

    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    left.utf8_text(source.as_bytes()).ok()
}

/// Whether an import statement binds `name` in the enclosing scope.
fn import_binds(node: Node<'_>, source: &str, name: &str) -> bool {
    let module_name = node.child_by_field_name("module_name").map(|n| n.id());
    let mut cursor = node.walk();

    node.children(&mut cursor).any(|child| {
        if Some(child.id()) == module_name {
            return false;
        }
        match child.kind() {
            // `import a.b` binds the first segment; `from m import x`
            // lists each bound name as its own dotted_name.
            "dotted_name" => {
                let bound = if node.kind() == "import_statement" {
                    child
                        .named_child(0)
                        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                } else {
                    child.utf8_text(source.as_bytes()).ok()
                };
                bound == Some(name)
            },
            "aliased_import" => {
                let alias = child
                    .child_by_field_name("alias")
                    .and_then(|n| n.utf8_text(source.as_bytes()).ok());
                alias == Some(name)
            },
            _ => false,
        }
    })
}

/// The body block of a class definition, unwrapping decorators.
fn class_body(node: Node<'_>) -> Option<Node<'_>> {
    let definition = if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition")?
    } else {
        node
    };

    if definition.kind() != "class_definition" {
        return None;
    }
    definition.child_by_field_name("body")
}

/// Expand a byte range to whole lines and return the covered text, so a
/// method extract keeps the indentation of its first line.
fn full_line_text(source: &str, start: usize, end: usize) -> String {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[end..].find('\n').map_or(source.len(), |i| end + i);
    source[line_start..line_end].to_string()
}

/// Parse Python source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_python(file: &Path, source: &str) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_python::LANGUAGE.into();
    parser.set_language(&language).map_err(|e| Error::ParseFailed {
        file: file.to_path_buf(),
        reason: e.to_string(),
    })?;

    parser.parse(source, None).ok_or_else(|| Error::ParseFailed {
        file: file.to_path_buf(),
        reason: "tree-sitter returned None".to_string(),
    })
}

fn source_result(code: String, namespace: &str) -> SourceResult {
    SourceResult {
        code,
        documentation_link: String::new(),
        namespace: namespace.to_string(),
        source_code_link: String::new(),
    }
}
