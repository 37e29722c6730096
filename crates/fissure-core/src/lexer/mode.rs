//! Lexical modes and the single-step transition function.
//!
//! The tracker never looks further ahead than two characters. Every step
//! consumes either one code point or one two-character delimiter
//! (`//`, `/*`, `*/`) and reports the mode the cursor is in afterwards.
//!
//! ## Precedence in code
//!
//! 1. `//` opens a line comment
//! 2. `/*` opens a block comment (no nesting)
//! 3. `"` opens a string literal
//! 4. `'` opens a character literal
//! 5. `{` and `}` are structural braces
//!
//! Inside comments and literals braces are inert.

/// Interpretation context of the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LexMode {
    /// Plain source code
    #[default]
    Code,
    /// Between `//` and the next line terminator
    LineComment,
    /// Between `/*` and `*/`
    BlockComment,
    /// Between two unescaped `"`
    StringLiteral,
    /// Between two unescaped `'`
    CharLiteral,
}

/// A structural brace seen in code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brace {
    /// `{`
    Open,
    /// `}`
    Close,
}

/// Outcome of consuming one lexical unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Mode after the consumed unit
    pub mode: LexMode,
    /// Bytes consumed
    pub len: usize,
    /// Structural brace consumed, if any
    pub brace: Option<Brace>,
}

impl Step {
    fn to(mode: LexMode, len: usize) -> Self {
        Self {
            mode,
            len,
            brace: None,
        }
    }

    fn brace(brace: Brace) -> Self {
        Self {
            mode: LexMode::Code,
            len: 1,
            brace: Some(brace),
        }
    }
}

impl LexMode {
    /// Returns true in plain code
    pub fn is_code(self) -> bool {
        self == LexMode::Code
    }

    /// Returns true inside either comment form
    pub fn is_comment(self) -> bool {
        matches!(self, LexMode::LineComment | LexMode::BlockComment)
    }

    /// Consume the lexical unit starting at byte offset `at`.
    ///
    /// Returns `None` at end of text, or if `at` does not fall on a
    /// character boundary.
    pub fn step(self, text: &str, at: usize) -> Option<Step> {
        let rest = text.get(at..)?;
        let ch = rest.chars().next()?;
        let width = ch.len_utf8();

        let step = match self {
            LexMode::Code => {
                if rest.starts_with("//") {
                    Step::to(LexMode::LineComment, 2)
                } else if rest.starts_with("/*") {
                    Step::to(LexMode::BlockComment, 2)
                } else {
                    match ch {
                        '"' => Step::to(LexMode::StringLiteral, 1),
                        '\'' => Step::to(LexMode::CharLiteral, 1),
                        '{' => Step::brace(Brace::Open),
                        '}' => Step::brace(Brace::Close),
                        _ => Step::to(LexMode::Code, width),
                    }
                }
            }
            LexMode::LineComment => match ch {
                '\n' | '\r' => Step::to(LexMode::Code, width),
                _ => Step::to(LexMode::LineComment, width),
            },
            LexMode::BlockComment => {
                if rest.starts_with("*/") {
                    Step::to(LexMode::Code, 2)
                } else {
                    Step::to(LexMode::BlockComment, width)
                }
            }
            LexMode::StringLiteral => match ch {
                '"' if !is_escaped(text, at) => Step::to(LexMode::Code, 1),
                _ => Step::to(LexMode::StringLiteral, width),
            },
            LexMode::CharLiteral => match ch {
                '\'' if !is_escaped(text, at) => Step::to(LexMode::Code, 1),
                _ => Step::to(LexMode::CharLiteral, width),
            },
        };

        Some(step)
    }
}

/// Whether the character at `at` is escaped.
///
/// A character is escaped iff the run of backslashes immediately before it
/// has odd length, so `"\\"` closes on its second quote while `"\""` does not.
pub fn is_escaped(text: &str, at: usize) -> bool {
    let Some(before) = text.as_bytes().get(..at) else {
        return false;
    };
    before.iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes(text: &str) -> Vec<LexMode> {
        let mut mode = LexMode::Code;
        let mut pos = 0;
        let mut seen = Vec::new();
        while let Some(step) = mode.step(text, pos) {
            mode = step.mode;
            pos += step.len;
            seen.push(mode);
        }
        seen
    }

    #[test]
    fn test_line_comment_ends_at_newline() {
        let seen = modes("// {\nx");
        assert_eq!(seen[0], LexMode::LineComment);
        assert_eq!(*seen.last().unwrap(), LexMode::Code);
    }

    #[test]
    fn test_block_comment_delimiters_are_two_wide() {
        let step = LexMode::Code.step("/*/ x */", 0).unwrap();
        assert_eq!(step.mode, LexMode::BlockComment);
        assert_eq!(step.len, 2);
        // `/*/` must not close the comment it just opened
        let step = LexMode::BlockComment.step("/*/ x */", 2).unwrap();
        assert_eq!(step.mode, LexMode::BlockComment);
    }

    #[test]
    fn test_slash_star_inside_line_comment_is_inert() {
        let seen = modes("// /* \nx");
        assert_eq!(*seen.last().unwrap(), LexMode::Code);
    }

    #[test]
    fn test_braces_report_only_in_code() {
        let step = LexMode::Code.step("{", 0).unwrap();
        assert_eq!(step.brace, Some(Brace::Open));
        let step = LexMode::StringLiteral.step("}", 0).unwrap();
        assert_eq!(step.brace, None);
        let step = LexMode::BlockComment.step("{", 0).unwrap();
        assert_eq!(step.brace, None);
    }

    #[test]
    fn test_is_escaped_counts_backslash_runs() {
        assert!(!is_escaped(r#"a""#, 1));
        assert!(is_escaped(r#"\""#, 1));
        assert!(!is_escaped(r#"\\""#, 2));
        assert!(is_escaped(r#"\\\""#, 3));
        assert!(!is_escaped("x", 10));
    }

    #[test]
    fn test_escaped_quote_stays_in_string() {
        let text = r#""a\"b""#;
        let mut mode = LexMode::Code;
        let mut pos = 0;
        let mut exits = Vec::new();
        while let Some(step) = mode.step(text, pos) {
            if mode == LexMode::StringLiteral && step.mode == LexMode::Code {
                exits.push(pos);
            }
            mode = step.mode;
            pos += step.len;
        }
        assert_eq!(exits, vec![text.len() - 1]);
    }

    #[test]
    fn test_char_literal_with_quote() {
        let seen = modes(r"'\'' x");
        assert_eq!(seen[3], LexMode::Code);
    }

    #[test]
    fn test_multibyte_code_points() {
        let step = LexMode::StringLiteral.step("é\"", 0).unwrap();
        assert_eq!(step.len, 2);
        assert!(LexMode::Code.step("é", 1).is_none());
    }
}
