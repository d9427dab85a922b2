//! Grammar registry: file extension to tree-sitter grammar resolution
//!
//! The mapping is a closed, static table. Grammars are shared, carry no
//! per-call state, and are safe to use from concurrent indexing calls.
//! Unsupported extensions are not an error; the caller records the file as
//! skipped and moves on.

use std::path::Path;

/// Supported languages, each backed by one tree-sitter grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    Swift,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
}

/// Whether a captured definition is a callable or a class-like container.
/// Callables nested inside containers become methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DefKind {
    Callable,
    Container,
}

impl Language {
    /// Resolve a language from a file path's extension
    pub fn from_path(path: &str) -> Option<Self> {
        let extension = Path::new(path).extension()?.to_str()?;
        Self::from_extension(extension)
    }

    /// Resolve a language from a bare extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        let language = match extension.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" => Language::Python,
            "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            "swift" => Language::Swift,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Language::Cpp,
            "cs" => Language::CSharp,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            _ => return None,
        };
        Some(language)
    }

    /// The shared grammar handle for this language
    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Swift => tree_sitter_swift::LANGUAGE.into(),
            Language::C => tree_sitter_c::LANGUAGE.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Language::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Language::Php => tree_sitter_php::LANGUAGE_PHP.into(),
        }
    }

    /// Human-readable language tag stored on every code unit
    pub fn name(&self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Java => "Java",
            Language::Swift => "Swift",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
        }
    }

    /// Classify a syntax node kind as an emittable definition, if any
    pub(crate) fn definition_kind(&self, node_kind: &str) -> Option<DefKind> {
        let def = match self {
            Language::Rust => match node_kind {
                "function_item" => DefKind::Callable,
                "struct_item" | "enum_item" | "trait_item" | "impl_item" | "mod_item" => {
                    DefKind::Container
                }
                _ => return None,
            },
            Language::Python => match node_kind {
                "function_definition" => DefKind::Callable,
                "class_definition" => DefKind::Container,
                _ => return None,
            },
            Language::JavaScript | Language::TypeScript => match node_kind {
                "function_declaration" | "generator_function_declaration" | "method_definition" => {
                    DefKind::Callable
                }
                "class_declaration" => DefKind::Container,
                _ => return None,
            },
            Language::Go => match node_kind {
                "function_declaration" | "method_declaration" => DefKind::Callable,
                "type_declaration" => DefKind::Container,
                _ => return None,
            },
            Language::Java => match node_kind {
                "method_declaration" | "constructor_declaration" => DefKind::Callable,
                "class_declaration" | "interface_declaration" | "enum_declaration" => {
                    DefKind::Container
                }
                _ => return None,
            },
            Language::Swift => match node_kind {
                "function_declaration" | "initializer_declaration" | "deinit_declaration" => {
                    DefKind::Callable
                }
                "class_declaration" | "protocol_declaration" => DefKind::Container,
                _ => return None,
            },
            Language::C => match node_kind {
                "function_definition" => DefKind::Callable,
                "struct_specifier" | "enum_specifier" | "union_specifier" => DefKind::Container,
                _ => return None,
            },
            Language::Cpp => match node_kind {
                "function_definition" => DefKind::Callable,
                "class_specifier" | "struct_specifier" | "enum_specifier"
                | "namespace_definition" => DefKind::Container,
                _ => return None,
            },
            Language::CSharp => match node_kind {
                "method_declaration" | "constructor_declaration" => DefKind::Callable,
                "class_declaration" | "struct_declaration" | "interface_declaration"
                | "enum_declaration" | "namespace_declaration" => DefKind::Container,
                _ => return None,
            },
            Language::Ruby => match node_kind {
                "method" | "singleton_method" => DefKind::Callable,
                "class" | "module" => DefKind::Container,
                _ => return None,
            },
            Language::Php => match node_kind {
                "function_definition" | "method_declaration" => DefKind::Callable,
                "class_declaration" | "interface_declaration" | "trait_declaration" => {
                    DefKind::Container
                }
                _ => return None,
            },
        };
        Some(def)
    }
}
