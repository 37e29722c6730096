//! Declaration header search.
//!
//! The locator finds every place where an exported type header textually
//! occurs: an access modifier, any secondary modifiers, a category keyword and
//! an identifier. It has no notion of nesting. Each candidate carries the
//! brace depth the lexer observed at its start, and the splitter combines that
//! with the spans of earlier candidates to tell top-level types from nested
//! ones.

mod dialect;

use crate::error::Result;
use crate::lexer::Walker;
use regex::Regex;
use tracing::{debug, trace};

pub use dialect::{DeclarationKind, Dialect};

/// A header that textually matches the declaration pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationCandidate {
    /// Declared type name
    pub name: String,
    /// Category keyword
    pub kind: DeclarationKind,
    /// Byte offset of the access modifier
    pub start: usize,
    /// Byte offset right after the type name
    pub header_end: usize,
    /// Structural braces open at `start`, counted from the start of the text
    pub depth: usize,
}

impl DeclarationCandidate {
    /// Returns true if no structural brace encloses the header
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }
}

/// Configuration for the locator
#[derive(Debug, Clone, Default)]
pub struct LocatorConfig {
    /// Keyword tables to match against
    pub dialect: Dialect,
    /// Keep only headers that start in code, not in comments or literals
    pub code_only: bool,
}

impl LocatorConfig {
    /// Creates a config for `dialect` that ignores headers outside code
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            code_only: true,
        }
    }

    /// Sets whether headers inside comments and literals are discarded
    pub fn code_only(mut self, code_only: bool) -> Self {
        self.code_only = code_only;
        self
    }
}

/// Finds declaration candidates in source text
#[derive(Debug, Clone)]
pub struct Locator {
    config: LocatorConfig,
    header: Regex,
    trivia: Regex,
}

impl Locator {
    /// Creates a locator from a config, compiling the dialect's patterns
    pub fn new(config: LocatorConfig) -> Result<Self> {
        let header = Regex::new(&header_pattern(config.dialect))?;
        let trivia = Regex::new(config.dialect.leading_trivia_pattern())?;
        Ok(Self {
            config,
            header,
            trivia,
        })
    }

    /// Creates a locator for `dialect` with default settings
    pub fn for_dialect(dialect: Dialect) -> Result<Self> {
        Self::new(LocatorConfig::new(dialect))
    }

    /// Returns the active configuration
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Find all candidates, ordered by strictly increasing start offset
    pub fn locate(&self, text: &str) -> Vec<DeclarationCandidate> {
        let mut walker = Walker::new(text);
        let mut candidates = Vec::new();

        let mut at = 0;
        while let Some(caps) = self.header.captures_at(text, at) {
            let (Some(whole), Some(kind), Some(name)) =
                (caps.get(0), caps.name("kind"), caps.name("name"))
            else {
                break;
            };
            let start = whole.start();
            // a rejected match may swallow the start of a real header
            let retry = start + text[start..].chars().next().map_or(1, char::len_utf8);

            if text[..start].chars().next_back().is_some_and(is_identifier_char) {
                trace!("Ignoring header glued to identifier at {}", start);
                at = retry;
                continue;
            }

            if self.config.dialect.is_reserved(name.as_str()) {
                trace!("Ignoring header named by keyword '{}' at {}", name.as_str(), start);
                at = retry;
                continue;
            }

            let probe = walker.advance_to(start);
            if self.config.code_only && !probe.mode.is_code() {
                trace!("Ignoring header '{}' in {:?} at {}", name.as_str(), probe.mode, start);
                at = retry;
                continue;
            }

            let Some(kind) = DeclarationKind::from_keyword(kind.as_str()) else {
                at = retry;
                continue;
            };

            trace!(
                "Candidate {} {} at {} (depth {})",
                kind,
                name.as_str(),
                start,
                probe.depth
            );
            candidates.push(DeclarationCandidate {
                name: name.as_str().to_string(),
                kind,
                start,
                header_end: name.end(),
                depth: probe.depth,
            });
            at = whole.end();
        }

        debug!("Located {} declaration candidate(s)", candidates.len());
        candidates
    }

    /// Offset where the doc comment and annotations directly above
    /// `candidate` begin, never earlier than `floor`.
    pub fn leading_trivia_start(
        &self,
        text: &str,
        candidate: &DeclarationCandidate,
        floor: usize,
    ) -> usize {
        let Some(window) = text.get(floor..candidate.start) else {
            return candidate.start;
        };
        self.trivia
            .find(window)
            .map_or(candidate.start, |m| floor + m.start())
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|word| regex::escape(word).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

fn header_pattern(dialect: Dialect) -> String {
    format!(
        r"\b(?:{access})\s+(?:(?:{modifiers})\s+)*(?P<kind>{kinds})\s+(?P<name>[\p{{L}}_$][\p{{L}}\p{{M}}\p{{N}}_$]*)",
        access = alternation(dialect.access_modifiers()),
        modifiers = alternation(dialect.secondary_modifiers()),
        kinds = alternation(dialect.type_keywords()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn java() -> Locator {
        Locator::for_dialect(Dialect::Java).unwrap()
    }

    fn names(candidates: &[DeclarationCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_locates_in_order() {
        let text = "package p;\n\npublic class X { }\npublic interface Y { }\npublic enum Z { A }\n";
        let found = java().locate(text);
        assert_eq!(names(&found), vec!["X", "Y", "Z"]);
        assert_eq!(found[0].start, text.find("public class X").unwrap());
        assert_eq!(found[1].kind, DeclarationKind::Interface);
        assert_eq!(found[2].kind, DeclarationKind::Enum);
        assert!(found.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_comment_ending_in_header_words() {
        let text = "package p;\n\n// keep this a public class\npublic class A { }\n\npublic class B { }\n\npublic class C { }\n";
        assert_eq!(names(&java().locate(text)), vec!["A", "B", "C"]);

        let raw = Locator::new(LocatorConfig::new(Dialect::Java).code_only(false)).unwrap();
        assert_eq!(names(&raw.locate(text)), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_keyword_is_never_a_name() {
        let text = "public class\npublic static class Inner {}";
        let raw = Locator::new(LocatorConfig::new(Dialect::Java).code_only(false)).unwrap();
        let found = raw.locate(text);
        assert_eq!(names(&found), vec!["Inner"]);
        assert_eq!(found[0].start, text.rfind("public").unwrap());
    }

    #[test]
    fn test_unicode_names() {
        let text = "public class Café {\n}\npublic enum Größe { S }\n";
        let found = java().locate(text);
        assert_eq!(names(&found), vec!["Café", "Größe"]);
        assert_eq!(found[0].header_end, text.find(" {").unwrap());
    }

    #[test]
    fn test_header_end_follows_name() {
        let text = "public class Order extends Base { }";
        let found = java().locate(text);
        assert_eq!(found[0].header_end, text.find(" extends").unwrap());
    }

    #[test]
    fn test_secondary_modifiers_any_order() {
        let text = "public final static class A {}\npublic abstract class B {}\npublic static final class C {}";
        assert_eq!(names(&java().locate(text)), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_keyword_boundaries() {
        let text = "notpublic class A {}\npublic classy B {}\npublic class C2$ {}\n$public class D {}";
        assert_eq!(names(&java().locate(text)), vec!["C2$"]);
    }

    #[test]
    fn test_non_public_and_members_ignored() {
        let text = "class Hidden {}\npublic static final String CLASS = \"x\";\npublic void enumerate() {}";
        assert!(java().locate(text).is_empty());
    }

    #[test]
    fn test_headers_in_comments_and_strings() {
        let text = "// public class Old {}\n/* public class Older {} */\nString s = \"public class Str {\";\npublic class Real {}";
        assert_eq!(names(&java().locate(text)), vec!["Real"]);

        let locator = Locator::new(LocatorConfig::new(Dialect::Java).code_only(false)).unwrap();
        assert_eq!(names(&locator.locate(text)), vec!["Old", "Older", "Str", "Real"]);
    }

    #[test]
    fn test_depth_marks_nested_candidates() {
        let text = "public class Outer {\n  public static class Inner {}\n}\npublic record Pair(int a) {}";
        let found = java().locate(text);
        assert_eq!(names(&found), vec!["Outer", "Inner", "Pair"]);
        assert_eq!(found.iter().map(|c| c.depth).collect::<Vec<_>>(), vec![0, 1, 0]);
        assert!(!found[1].is_top_level());
        assert_eq!(found[2].kind, DeclarationKind::Record);
    }

    #[test]
    fn test_annotation_type() {
        let found = java().locate("public @interface Audited {}");
        assert_eq!(found[0].name, "Audited");
        assert_eq!(found[0].kind, DeclarationKind::Annotation);
    }

    #[test]
    fn test_csharp_headers() {
        let locator = Locator::for_dialect(Dialect::CSharp).unwrap();
        let text = "public sealed partial class A {}\npublic readonly record struct B(int X);\npublic struct C {}";
        let found = locator.locate(text);
        assert_eq!(names(&found), vec!["A", "B", "C"]);
        assert_eq!(found[1].kind, DeclarationKind::Record);
        assert_eq!(found[2].kind, DeclarationKind::Struct);
    }

    #[test]
    fn test_leading_trivia() {
        let text = "package p;\n\n/** Docs {@link X}. */\n@Deprecated\n@SuppressWarnings(\"unused\")\npublic class A {}";
        let locator = java();
        let found = locator.locate(text);
        let floor = text.find('\n').unwrap();
        assert_eq!(
            locator.leading_trivia_start(text, &found[0], floor),
            text.find("/**").unwrap()
        );
        // the floor wins over trivia that starts before it
        let floor = text.find("@Deprecated").unwrap();
        assert_eq!(locator.leading_trivia_start(text, &found[0], floor), floor);
    }

    #[test]
    fn test_plain_comment_is_not_trivia() {
        let text = "}\n/* not a doc */\npublic class A {}";
        let locator = java();
        let found = locator.locate(text);
        assert_eq!(locator.leading_trivia_start(text, &found[0], 1), found[0].start);
    }

    #[test]
    fn test_csharp_leading_trivia() {
        let text = "namespace N;\n\n/// <summary>A</summary>\n[Serializable]\npublic class A {}";
        let locator = Locator::for_dialect(Dialect::CSharp).unwrap();
        let found = locator.locate(text);
        assert_eq!(
            locator.leading_trivia_start(text, &found[0], 12),
            text.find("///").unwrap()
        );
    }
}
