/// Core domain types for codecite references, tags, and resolved source.

/// The normalized symbol kinds an inventory can index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalTag {
    /// A module-level or class-level attribute.
    Attribute,
    /// A class definition.
    Class,
    /// A method bound to the class rather than an instance.
    ClassMethod,
    /// A module-level function.
    Function,
    /// An instance method, addressed as `Class.method`.
    Method,
    /// A whole module.
    Module,
    /// A method with no implicit receiver.
    StaticMethod,
}

impl CanonicalTag {
    /// The order in which a wildcard reference probes the inventory.
    /// The first tag that indexes the namespace wins.
    pub const WILDCARD_SEARCH_ORDER: [CanonicalTag; 7] = [
        CanonicalTag::Attribute,
        CanonicalTag::Function,
        CanonicalTag::ClassMethod,
        CanonicalTag::StaticMethod,
        CanonicalTag::Method,
        CanonicalTag::Class,
        CanonicalTag::Module,
    ];

    /// Parse an inventory key back into a canonical tag.
    pub fn from_inventory_key(key: &str) -> Option<Self> {
        match key {
            "py:attribute" => Some(CanonicalTag::Attribute),
            "py:class" => Some(CanonicalTag::Class),
            "py:classmethod" => Some(CanonicalTag::ClassMethod),
            "py:function" => Some(CanonicalTag::Function),
            "py:method" => Some(CanonicalTag::Method),
            "py:module" => Some(CanonicalTag::Module),
            "py:staticmethod" => Some(CanonicalTag::StaticMethod),
            _ => None,
        }
    }

    /// The key this tag is stored under in inventory files.
    pub fn inventory_key(self) -> &'static str {
        match self {
            CanonicalTag::Attribute => "py:attribute",
            CanonicalTag::Class => "py:class",
            CanonicalTag::ClassMethod => "py:classmethod",
            CanonicalTag::Function => "py:function",
            CanonicalTag::Method => "py:method",
            CanonicalTag::Module => "py:module",
            CanonicalTag::StaticMethod => "py:staticmethod",
        }
    }
}

/// Parsed from a reference target by the reference parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Dot-separated identifier path, e.g. `pkg.mod.Class.method`.
    pub namespace: String,
    /// Raw short tag (`func`, `meth`, the wildcard `obj`, ...) or an
    /// already-canonical inventory key such as `py:function`.
    pub tag: String,
}

/// Output of one successful resolution, handed to the boundary layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResult {
    /// The extracted source text.
    pub code: String,
    /// Absolute location of the documentation page that indexed the symbol.
    /// Empty for the package-source strategy.
    pub documentation_link: String,
    /// The namespace the result was resolved for.
    pub namespace: String,
    /// Permalink to the rendered source fragment.
    /// Empty for the package-source strategy.
    pub source_code_link: String,
}
