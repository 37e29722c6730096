//! Package and import extraction.
//!
//! Every unit split out of a file repeats that file's header: the one
//! package/namespace statement and the import/using statements that precede
//! the first declaration. Statements are copied verbatim; only the spacing
//! between them is normalized.

use crate::error::{Error, Result};
use crate::lexer::Walker;
use crate::locate::Dialect;
use regex::Regex;
use tracing::trace;

/// Package statement and imports shared by all units of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    /// The package/namespace statement, including its `;`
    pub package: String,
    /// Import/using statements in source order, duplicates kept
    pub imports: Vec<String>,
    /// One past the last header statement in the source text
    pub end: usize,
}

impl HeaderBlock {
    /// Creates a header block whose last statement ends at `end`
    pub fn new(package: impl Into<String>, imports: Vec<String>, end: usize) -> Self {
        Self {
            package: package.into(),
            imports,
            end,
        }
    }

    /// Render the block: package, blank line, imports, blank line
    pub fn render(&self) -> String {
        let imports_len: usize = self.imports.iter().map(|i| i.len() + 1).sum();
        let mut out = String::with_capacity(self.package.len() + imports_len + 3);

        out.push_str(&self.package);
        out.push_str("\n\n");
        if !self.imports.is_empty() {
            out.push_str(&self.imports.join("\n"));
            out.push_str("\n\n");
        }
        out
    }
}

/// Extracts [`HeaderBlock`]s for one dialect
#[derive(Debug, Clone)]
pub struct HeaderExtractor {
    package: Regex,
    import: Regex,
}

impl HeaderExtractor {
    /// Creates an extractor, compiling the dialect's patterns
    pub fn new(dialect: Dialect) -> Result<Self> {
        Ok(Self {
            package: Regex::new(dialect.package_pattern())?,
            import: Regex::new(dialect.import_pattern())?,
        })
    }

    /// Extract the header of `text`.
    ///
    /// The package statement is the first one found in code anywhere in the
    /// text. Imports are collected from code before `limit`, normally the
    /// start of the first top-level declaration.
    pub fn extract(&self, text: &str, limit: usize) -> Result<HeaderBlock> {
        let mut walker = Walker::new(text);
        let package = self
            .package
            .find_iter(text)
            .find(|m| walker.advance_to(m.start()).mode.is_code())
            .ok_or(Error::MissingPackageDeclaration)?;

        let window = text.get(..limit).unwrap_or(text);
        let mut walker = Walker::new(text);
        let mut end = package.end();
        let mut imports = Vec::new();

        for m in self.import.find_iter(window) {
            if !walker.advance_to(m.start()).mode.is_code() {
                trace!("Ignoring import outside code at {}", m.start());
                continue;
            }
            imports.push(m.as_str().to_string());
            end = end.max(m.end());
        }

        trace!(
            "Header: '{}' with {} import(s), ends at {}",
            package.as_str(),
            imports.len(),
            end
        );

        Ok(HeaderBlock::new(package.as_str(), imports, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn java() -> HeaderExtractor {
        HeaderExtractor::new(Dialect::Java).unwrap()
    }

    #[test]
    fn test_extract_package_and_imports() {
        let text = "package com.shop.model;\n\nimport java.util.List;\nimport static java.util.Objects.requireNonNull;\n\npublic class A {}";
        let header = java().extract(text, text.find("public").unwrap()).unwrap();
        assert_eq!(header.package, "package com.shop.model;");
        assert_eq!(
            header.imports,
            vec![
                "import java.util.List;".to_string(),
                "import static java.util.Objects.requireNonNull;".to_string(),
            ]
        );
        assert_eq!(header.end, text.find("\n\npublic").unwrap());
    }

    #[test]
    fn test_missing_package() {
        let err = java().extract("import a.B;\npublic class A {}", 0).unwrap_err();
        assert_eq!(err, Error::MissingPackageDeclaration);
    }

    #[test]
    fn test_package_in_comment_is_ignored() {
        let text = "// package fake;\n/* package fake2; */\npackage real;\n";
        let header = java().extract(text, text.len()).unwrap();
        assert_eq!(header.package, "package real;");

        let err = java().extract("// package only.here;\n", 22).unwrap_err();
        assert_eq!(err, Error::MissingPackageDeclaration);
    }

    #[test]
    fn test_imports_after_limit_are_excluded() {
        let text = "package p;\nimport a.A;\npublic class X {}\nimport b.B;\n";
        let header = java().extract(text, text.find("public").unwrap()).unwrap();
        assert_eq!(header.imports, vec!["import a.A;".to_string()]);
    }

    #[test]
    fn test_duplicates_and_inner_whitespace_preserved() {
        let text = "package p;\nimport  a.A;\nimport  a.A;\n";
        let header = java().extract(text, text.len()).unwrap();
        assert_eq!(header.imports, vec!["import  a.A;".to_string(), "import  a.A;".to_string()]);
    }

    #[test]
    fn test_render() {
        let header = HeaderBlock::new("package p;", vec!["import a.B;".into(), "import c.D;".into()], 0);
        assert_eq!(header.render(), "package p;\n\nimport a.B;\nimport c.D;\n\n");

        let header = HeaderBlock::new("package p;", vec![], 0);
        assert_eq!(header.render(), "package p;\n\n");
    }

    #[test]
    fn test_csharp_header() {
        let extractor = HeaderExtractor::new(Dialect::CSharp).unwrap();
        let text = "global using System;\nusing static System.Math;\nnamespace Shop.Models;\n\npublic class A {}";
        let header = extractor.extract(text, text.find("public").unwrap()).unwrap();
        assert_eq!(header.package, "namespace Shop.Models;");
        assert_eq!(
            header.imports,
            vec!["global using System;".to_string(), "using static System.Math;".to_string()]
        );
    }

    #[test]
    fn test_block_scoped_namespace_is_not_a_package() {
        let extractor = HeaderExtractor::new(Dialect::CSharp).unwrap();
        let err = extractor.extract("namespace Shop { public class A {} }", 0).unwrap_err();
        assert_eq!(err, Error::MissingPackageDeclaration);
    }
}
