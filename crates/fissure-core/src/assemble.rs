//! Output unit assembly.

use crate::header::HeaderBlock;
use crate::locate::DeclarationKind;
use std::ops::Range;

/// One self-contained unit split out of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputUnit {
    /// Declared type name
    pub name: String,
    /// Category of the declaration
    pub kind: DeclarationKind,
    /// Derived file name, `<name>.<ext>`
    pub file_name: String,
    /// Full text of the unit
    pub content: String,
    /// Byte range of the declaration in the original text
    pub span: Range<usize>,
    /// Set when the declaration span was clamped and should be checked by hand
    pub needs_review: bool,
}

/// Concatenate the header block and one declaration.
///
/// The declaration is trimmed at its own boundaries only; its internal
/// formatting is kept. The result always ends in a single newline.
pub fn assemble(header: &HeaderBlock, declaration: &str) -> String {
    let declaration = declaration.trim();
    let mut unit = header.render();
    unit.reserve(declaration.len() + 1);
    unit.push_str(declaration);
    unit.push('\n');
    unit
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assemble_layout() {
        let header = HeaderBlock::new("package p;", vec!["import a.B;".into()], 0);
        let unit = assemble(&header, "\n\npublic class X {\n    int x;\n}\n\n");
        assert_eq!(unit, "package p;\n\nimport a.B;\n\npublic class X {\n    int x;\n}\n");
    }

    #[test]
    fn test_assemble_is_idempotent() {
        let header = HeaderBlock::new("package p;", vec!["import a.B;".into(), "import a.B;".into()], 0);
        let first = assemble(&header, "public interface Y { }");
        let second = assemble(&header, "public interface Y { }");
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_assemble_without_imports() {
        let header = HeaderBlock::new("namespace Shop;", vec![], 0);
        assert_eq!(
            assemble(&header, "public struct S { }"),
            "namespace Shop;\n\npublic struct S { }\n"
        );
    }
}
