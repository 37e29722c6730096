//! Lexical context tracking for brace-delimited source text.
//!
//! This module finds where a declaration's body closes. It walks the text one
//! code point at a time with an explicit [`LexMode`], so that braces inside
//! string literals, character literals and comments never count.
//!
//! ## Algorithm Overview
//!
//! 1. Start in code mode right after the declaration header
//! 2. Walk forward to the first structural `{`
//! 3. Count `{` up and `}` down, ignoring everything outside code mode
//! 4. Stop when the counter returns to zero; the body ends one past that `}`
//!
//! The same state machine drives [`Walker`], which reports the mode and brace
//! depth at arbitrary offsets and is what the locator and header extractor
//! use to ignore matches inside comments and literals.

mod mode;

use std::ops::Range;
use thiserror::Error;
use tracing::trace;

pub use mode::{is_escaped, Brace, LexMode, Step};

/// Why a declaration body could not be delimited
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// End of text reached before any structural `{`
    #[error("no opening brace before end of text")]
    NoOpeningBrace,

    /// A structural `}` appeared before the body opened
    #[error("closing brace at offset {offset} before the body opened")]
    StrayClosingBrace {
        /// Byte offset of the stray brace
        offset: usize,
    },

    /// End of text reached with braces still open
    #[error("end of text reached with {depth} unclosed brace(s)")]
    UnclosedBody {
        /// Open braces left on the counter
        depth: usize,
    },
}

/// Location of a declaration body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodySpan {
    /// Byte offset of the opening `{`, `None` for a declaration ended by `;`
    pub open: Option<usize>,
    /// One past the closing `}`, clamped to the boundary if one was given
    pub end: usize,
    /// One past the closing `}`, as scanned
    pub raw_end: usize,
}

impl BodySpan {
    fn new(open: Option<usize>, raw_end: usize, boundary: Option<usize>) -> Self {
        let end = match boundary {
            Some(limit) if raw_end > limit => limit,
            _ => raw_end,
        };
        Self { open, end, raw_end }
    }

    /// Returns true if the scanned end overran the boundary
    pub fn is_clamped(&self) -> bool {
        self.end != self.raw_end
    }
}

/// Find the offset one past the closing brace of the body that follows
/// `header_end`.
pub fn find_body_end(text: &str, header_end: usize) -> Result<usize, MalformedReason> {
    scan_body(text, header_end, None).map(|span| span.end)
}

/// Scan the declaration body following `header_end`.
///
/// A `;` in code before the body opens ends a declaration that has no body,
/// such as a positional record.
///
/// If `boundary` is given and the body would end past it, the returned span
/// is clamped to the boundary and [`BodySpan::is_clamped`] reports it.
pub fn scan_body(
    text: &str,
    header_end: usize,
    boundary: Option<usize>,
) -> Result<BodySpan, MalformedReason> {
    let mut mode = LexMode::Code;
    let mut depth = 0usize;
    let mut open = header_end;
    let mut position = header_end;

    while let Some(step) = mode.step(text, position) {
        if depth == 0 && mode.is_code() && text[position..].starts_with(';') {
            trace!("Declaration without body ends at {}", position);
            return Ok(BodySpan::new(None, position + 1, boundary));
        }

        match step.brace {
            Some(Brace::Open) => {
                if depth == 0 {
                    open = position;
                    trace!("Body opens at {}", position);
                }
                depth += 1;
            }
            Some(Brace::Close) => {
                if depth == 0 {
                    return Err(MalformedReason::StrayClosingBrace { offset: position });
                }
                depth -= 1;
                if depth == 0 {
                    let span = BodySpan::new(Some(open), position + 1, boundary);
                    trace!("Body closes at {} (end {})", position, span.end);
                    return Ok(span);
                }
            }
            None => {}
        }

        mode = step.mode;
        position += step.len;
    }

    if depth == 0 {
        Err(MalformedReason::NoOpeningBrace)
    } else {
        Err(MalformedReason::UnclosedBody { depth })
    }
}

/// Lexical state observed at an offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Mode the character at the offset is read in
    pub mode: LexMode,
    /// Structural braces open at the offset
    pub depth: usize,
}

/// Forward-only cursor that tracks mode and brace depth from offset 0.
///
/// Offsets passed to [`Walker::advance_to`] must be non-decreasing; an offset
/// behind the cursor reports the current state.
#[derive(Debug, Clone)]
pub struct Walker<'a> {
    text: &'a str,
    position: usize,
    mode: LexMode,
    depth: usize,
}

impl<'a> Walker<'a> {
    /// Creates a walker positioned at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            mode: LexMode::Code,
            depth: 0,
        }
    }

    #[cfg(test)]
    fn position(&self) -> usize {
        self.position
    }

    /// Advance to `offset` and report the state there
    pub fn advance_to(&mut self, offset: usize) -> Probe {
        while self.position < offset {
            let Some(step) = self.mode.step(self.text, self.position) else {
                break;
            };
            match step.brace {
                Some(Brace::Open) => self.depth += 1,
                // unbalanced input: clamp at zero instead of underflowing
                Some(Brace::Close) => self.depth = self.depth.saturating_sub(1),
                None => {}
            }
            self.mode = step.mode;
            self.position += step.len;
        }

        Probe {
            mode: self.mode,
            depth: self.depth,
        }
    }
}

/// Offset of the first code character in `range` that is neither whitespace
/// nor part of a comment.
///
/// The range is assumed to start in code mode, as every gap between two
/// declaration bodies does.
pub fn first_code_offset(text: &str, range: Range<usize>) -> Option<usize> {
    let mut mode = LexMode::Code;
    let mut position = range.start;

    while position < range.end {
        let step = mode.step(text, position)?;
        if mode.is_code() && !step.mode.is_comment() {
            let starts_blank = text[position..].starts_with(char::is_whitespace);
            if !starts_blank {
                return Some(position);
            }
        }
        mode = step.mode;
        position += step.len;
    }

    None
}
