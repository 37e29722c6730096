//! Keyword tables for the supported brace-delimited languages.

use std::path::Path;

/// Source language whose keyword tables drive the locator and header extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Java: `package` / `import`
    #[default]
    Java,
    /// C#: file-scoped `namespace` / `using`
    CSharp,
}

impl Dialect {
    /// Every supported dialect
    pub const ALL: [Dialect; 2] = [Dialect::Java, Dialect::CSharp];

    /// Detect dialect from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "java" => Some(Dialect::Java),
            "cs" => Some(Dialect::CSharp),
            _ => None,
        }
    }

    /// Detect dialect from a file path
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Dialect name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Java => "java",
            Dialect::CSharp => "csharp",
        }
    }

    /// Extension of files in this dialect, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::Java => "java",
            Dialect::CSharp => "cs",
        }
    }

    /// Modifiers that make a type exported
    pub fn access_modifiers(self) -> &'static [&'static str] {
        &["public"]
    }

    /// Modifiers allowed between the access modifier and the category keyword
    pub fn secondary_modifiers(self) -> &'static [&'static str] {
        match self {
            Dialect::Java => &["static", "final", "abstract", "sealed", "non-sealed", "strictfp"],
            Dialect::CSharp => &["static", "sealed", "abstract", "partial", "readonly", "unsafe", "new"],
        }
    }

    /// Category keywords, multi-word forms first
    pub fn type_keywords(self) -> &'static [&'static str] {
        match self {
            Dialect::Java => &["class", "interface", "enum", "record", "@interface"],
            Dialect::CSharp => &[
                "record struct",
                "record class",
                "class",
                "interface",
                "enum",
                "struct",
                "record",
            ],
        }
    }

    /// Returns true if `word` can never name a type in this dialect
    pub fn is_reserved(self, word: &str) -> bool {
        let reserved: &[&str] = match self {
            Dialect::Java => &[
                "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char",
                "class", "const", "continue", "default", "do", "double", "else", "enum",
                "extends", "false", "final", "finally", "float", "for", "goto", "if",
                "implements", "import", "instanceof", "int", "interface", "long", "native",
                "new", "null", "package", "permits", "private", "protected", "public", "record",
                "return", "sealed", "short", "static", "strictfp", "super", "switch",
                "synchronized", "this", "throw", "throws", "transient", "true", "try", "var",
                "void", "volatile", "while", "yield",
            ],
            Dialect::CSharp => &[
                "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char",
                "checked", "class", "const", "continue", "decimal", "default", "delegate", "do",
                "double", "else", "enum", "event", "explicit", "extern", "false", "finally",
                "fixed", "float", "for", "foreach", "goto", "if", "implicit", "in", "int",
                "interface", "internal", "is", "lock", "long", "namespace", "new", "null",
                "object", "operator", "out", "override", "params", "partial", "private",
                "protected", "public", "readonly", "record", "ref", "return", "sbyte", "sealed",
                "short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this",
                "throw", "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe",
                "ushort", "using", "virtual", "void", "volatile", "while",
            ],
        };
        reserved.contains(&word)
    }

    /// Pattern for the package/namespace statement
    pub(crate) fn package_pattern(self) -> &'static str {
        match self {
            Dialect::Java => r"\bpackage\s+[^;{}]+;",
            Dialect::CSharp => r"\bnamespace\s+[^;{}]+;",
        }
    }

    /// Pattern for one import/using statement
    pub(crate) fn import_pattern(self) -> &'static str {
        match self {
            Dialect::Java => r"\bimport\s+(?:static\s+)?[^;{}]+;",
            Dialect::CSharp => r"\b(?:global\s+)?using\s+(?:static\s+)?[^;{}()]+;",
        }
    }

    /// Pattern for the doc comment and annotations directly above a header,
    /// anchored at the end of the searched window
    pub(crate) fn leading_trivia_pattern(self) -> &'static str {
        match self {
            Dialect::Java => r"(?:/\*\*(?:[^*]|\*+[^*/])*\*+/\s*)?(?:@[\w.]+(?:\([^)]*\))?\s*)*\z",
            Dialect::CSharp => r"(?:///[^\n]*\n\s*)*(?:\[[^\]]*\]\s*)*\z",
        }
    }
}

/// Category of a located type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `class`
    Class,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// `record`, `record class`, `record struct`
    Record,
    /// `@interface`
    Annotation,
    /// `struct`
    Struct,
}

impl DeclarationKind {
    /// Classify the keyword text captured by the header pattern
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let first = keyword.split_whitespace().next()?;
        match first {
            "class" => Some(DeclarationKind::Class),
            "interface" => Some(DeclarationKind::Interface),
            "enum" => Some(DeclarationKind::Enum),
            "record" => Some(DeclarationKind::Record),
            "@interface" => Some(DeclarationKind::Annotation),
            "struct" => Some(DeclarationKind::Struct),
            _ => None,
        }
    }

    /// Kind name as string
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Record => "record",
            DeclarationKind::Annotation => "annotation",
            DeclarationKind::Struct => "struct",
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Dialect::from_path("src/Order.java"), Some(Dialect::Java));
        assert_eq!(Dialect::from_path("Models/Order.CS"), Some(Dialect::CSharp));
        assert_eq!(Dialect::from_path("README.md"), None);
        assert_eq!(Dialect::from_path("Makefile"), None);
    }

    #[test]
    fn test_kind_from_keyword() {
        assert_eq!(DeclarationKind::from_keyword("record struct"), Some(DeclarationKind::Record));
        assert_eq!(DeclarationKind::from_keyword("@interface"), Some(DeclarationKind::Annotation));
        assert_eq!(DeclarationKind::from_keyword("module"), None);
    }

    #[test]
    fn test_reserved_words() {
        assert!(Dialect::Java.is_reserved("public"));
        assert!(Dialect::Java.is_reserved("record"));
        assert!(!Dialect::Java.is_reserved("Record"));
        assert!(Dialect::CSharp.is_reserved("partial"));
        assert!(!Dialect::CSharp.is_reserved("permits"));
        for dialect in Dialect::ALL {
            for modifier in dialect.access_modifiers() {
                assert!(dialect.is_reserved(modifier));
            }
        }
    }

    #[test]
    fn test_multi_word_keywords_come_first() {
        for dialect in Dialect::ALL {
            let keywords = dialect.type_keywords();
            for (i, keyword) in keywords.iter().enumerate() {
                let shadowed = keywords[..i]
                    .iter()
                    .any(|earlier| keyword.starts_with(earlier) && keyword != earlier);
                assert!(!shadowed, "{keyword} is shadowed in {}", dialect.as_str());
            }
        }
    }
}
