//! Node-kind classification for the TypeScript grammar family.
//!
//! The TypeScript, TSX, and JavaScript grammars share their statement
//! vocabulary, so one classifier serves all three flavors. Kinds absent
//! from plain JavaScript (`interface_declaration`, `enum_declaration`,
//! `type_alias_declaration`) simply never appear in its trees.

use nudge_core::classify::DeclarationClassifier;
use nudge_core::types::DeclarationKind;

/// Stateless classifier for tree-sitter's TypeScript/JavaScript grammars.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptClassifier;

impl DeclarationClassifier for TypeScriptClassifier {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn classify(&self, node_kind: &str) -> Option<DeclarationKind> {
        match node_kind {
            "class_declaration" | "abstract_class_declaration" => Some(DeclarationKind::Class),
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                Some(DeclarationKind::Function)
            }
            "interface_declaration" => Some(DeclarationKind::Interface),
            "type_alias_declaration" => Some(DeclarationKind::TypeAlias),
            "statement_block" => Some(DeclarationKind::Block),
            "lexical_declaration" | "variable_declaration" => Some(DeclarationKind::Variable),
            "enum_declaration" => Some(DeclarationKind::Enum),
            // Namespaces and ambient declarations are reorderable units but
            // carry no dedicated kind of their own.
            "module" | "internal_module" | "ambient_declaration" => Some(DeclarationKind::Unknown),
            _ => None,
        }
    }

    fn is_transparent(&self, node_kind: &str) -> bool {
        node_kind == "export_statement"
    }

    fn is_identifier_leaf(&self, node_kind: &str) -> bool {
        matches!(
            node_kind,
            "identifier"
                | "type_identifier"
                | "property_identifier"
                | "shorthand_property_identifier"
                | "shorthand_property_identifier_pattern"
        )
    }

    fn is_declarator(&self, node_kind: &str) -> bool {
        node_kind == "variable_declarator"
    }
}

// ============================================================================
// Tests
// ============================================================================
