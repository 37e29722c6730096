//! In-memory splitting of one source text.
//!
//! [`Splitter::split`] runs the whole pipeline for a single file:
//!
//! 1. Locate declaration candidates
//! 2. Scan each candidate's body, discarding candidates nested in an earlier
//!    accepted span
//! 3. Decide eligibility (more than one top-level declaration)
//! 4. Extract the header and assemble one unit per declaration
//! 5. Flag code that no unit covers and units that share a file name
//!
//! Nothing here touches the filesystem. The caller decides what to write and
//! whether the original may be deleted, using [`SplitReport::is_clean`].

use crate::assemble::{assemble, OutputUnit};
use crate::error::{Error, Result};
use crate::header::{HeaderBlock, HeaderExtractor};
use crate::lexer::{first_code_offset, scan_body, BodySpan};
use crate::locate::{DeclarationCandidate, Dialect, Locator, LocatorConfig};
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;
use tracing::{debug, trace, warn};

/// Configuration for the splitter
#[derive(Debug, Clone)]
pub struct SplitterConfig {
    /// Language of the input text
    pub dialect: Dialect,
    /// Ignore declaration headers inside comments and literals
    pub code_only: bool,
    /// Carry doc comments and annotations along with their declaration
    pub leading_trivia: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Java,
            code_only: true,
            leading_trivia: true,
        }
    }
}

impl SplitterConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input language
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets whether headers inside comments and literals are ignored
    pub fn code_only(mut self, code_only: bool) -> Self {
        self.code_only = code_only;
        self
    }

    /// Sets whether doc comments and annotations travel with their declaration
    pub fn leading_trivia(mut self, include: bool) -> Self {
        self.leading_trivia = include;
        self
    }
}

/// Non-fatal findings that require a human to look at the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A body scan overran the next declaration and was cut at its start
    ClampedBoundary {
        /// Declaration whose span was clamped
        name: String,
        /// Where the scan actually ended
        raw_end: usize,
        /// Where the span was cut
        boundary: usize,
    },

    /// Code outside the header and every extracted declaration
    UncoveredCode {
        /// Byte offset of the first uncovered code character
        offset: usize,
        /// 1-based line of that character
        line: usize,
    },

    /// A unit would be written to the same file as an earlier unit, as with
    /// C# generic arity overloads or repeated partial declarations
    DuplicateFileName {
        /// The shared file name
        file_name: String,
        /// Start of the later declaration's span
        offset: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ClampedBoundary {
                name,
                raw_end,
                boundary,
            } => write!(
                f,
                "declaration '{}' clamped at offset {} (scan ended at {})",
                name, boundary, raw_end
            ),
            Diagnostic::UncoveredCode { offset, line } => write!(
                f,
                "code at line {} (offset {}) belongs to no extracted declaration",
                line, offset
            ),
            Diagnostic::DuplicateFileName { file_name, offset } => write!(
                f,
                "declaration at offset {} also maps to {}",
                offset, file_name
            ),
        }
    }
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Extracted as a unit
    Extracted {
        /// Body span, including leading trivia
        span: Range<usize>,
    },
    /// Extracted, but the span was clamped to the next declaration
    Clamped {
        /// Clamped span, including leading trivia
        span: Range<usize>,
        /// Where the scan actually ended
        raw_end: usize,
    },
    /// Discarded as a nested declaration
    Nested {
        /// Enclosing extracted declaration, if one was found
        within: Option<String>,
    },
    /// Skipped because its body could not be delimited
    Malformed(Error),
}

/// A candidate and its outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
    /// The located candidate
    pub candidate: DeclarationCandidate,
    /// What the splitter did with it
    pub outcome: CandidateOutcome,
}

/// Result of splitting an eligible text
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Header shared by every unit
    pub header: HeaderBlock,
    /// One unit per extracted declaration, in source order
    pub units: Vec<OutputUnit>,
    /// Every located candidate, in source order
    pub candidates: Vec<CandidateReport>,
    /// Findings that need review
    pub diagnostics: Vec<Diagnostic>,
}

impl SplitReport {
    /// Errors of candidates that could not be extracted
    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        self.candidates.iter().filter_map(|report| match &report.outcome {
            CandidateOutcome::Malformed(err) => Some(err),
            _ => None,
        })
    }

    /// Returns true if the units fully replace the original text
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none() && self.diagnostics.is_empty()
    }
}

/// Outcome of [`Splitter::split`]
#[derive(Debug, Clone)]
pub enum SplitOutcome {
    /// Fewer than two top-level declarations; nothing to do
    NotEligible {
        /// Top-level declarations found
        candidates: usize,
    },
    /// The text splits into units
    Split(SplitReport),
}

/// Splits source text into one unit per top-level declaration
#[derive(Debug, Clone)]
pub struct Splitter {
    config: SplitterConfig,
    locator: Locator,
    header: HeaderExtractor,
}

impl Splitter {
    /// Creates a splitter, compiling the dialect's patterns
    pub fn new(config: SplitterConfig) -> Result<Self> {
        let locator =
            Locator::new(LocatorConfig::new(config.dialect).code_only(config.code_only))?;
        let header = HeaderExtractor::new(config.dialect)?;
        Ok(Self {
            config,
            locator,
            header,
        })
    }

    /// Creates a splitter for `dialect` with default settings
    pub fn for_dialect(dialect: Dialect) -> Result<Self> {
        Self::new(SplitterConfig::new().dialect(dialect))
    }

    /// Returns the active configuration
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Returns the locator used by this splitter
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Split `text`.
    ///
    /// Fails only with [`Error::MissingPackageDeclaration`]; malformed
    /// declarations are reported per candidate in the [`SplitReport`].
    pub fn split(&self, text: &str) -> Result<SplitOutcome> {
        let candidates = self.locator.locate(text);
        let (accepted, mut reports) = resolve_spans(text, candidates);

        let top_level: Vec<&DeclarationCandidate> = reports
            .iter()
            .filter(|r| !matches!(r.outcome, CandidateOutcome::Nested { .. }))
            .map(|r| &r.candidate)
            .collect();

        if top_level.len() <= 1 {
            debug!("Not eligible: {} top-level declaration(s)", top_level.len());
            return Ok(SplitOutcome::NotEligible {
                candidates: top_level.len(),
            });
        }

        let limit = top_level.first().map_or(text.len(), |c| c.start);
        let header = self.header.extract(text, limit)?;

        let mut units = Vec::with_capacity(accepted.len());
        let mut diagnostics = Vec::new();
        let mut floor = header.end;

        for (index, body) in accepted {
            let candidate = &reports[index].candidate;
            let start = if self.config.leading_trivia {
                self.locator
                    .leading_trivia_start(text, candidate, floor.min(candidate.start))
            } else {
                candidate.start
            };
            let span = start..body.end;

            if body.is_clamped() {
                warn!(
                    "Declaration '{}' overran the next declaration; clamped at {}",
                    candidate.name, body.end
                );
                diagnostics.push(Diagnostic::ClampedBoundary {
                    name: candidate.name.clone(),
                    raw_end: body.raw_end,
                    boundary: body.end,
                });
            }

            units.push(OutputUnit {
                name: candidate.name.clone(),
                kind: candidate.kind,
                file_name: format!("{}.{}", candidate.name, self.config.dialect.extension()),
                content: assemble(&header, &text[span.clone()]),
                span: span.clone(),
                needs_review: body.is_clamped(),
            });

            reports[index].outcome = if body.is_clamped() {
                CandidateOutcome::Clamped {
                    span,
                    raw_end: body.raw_end,
                }
            } else {
                CandidateOutcome::Extracted { span }
            };
            floor = body.end;
        }

        if let Some(offset) = uncovered_code(text, header.end, &units) {
            let line = text[..offset].matches('\n').count() + 1;
            warn!("Code at line {} belongs to no extracted declaration", line);
            diagnostics.push(Diagnostic::UncoveredCode { offset, line });
        }

        let mut seen = HashSet::new();
        for unit in &units {
            if !seen.insert(unit.file_name.as_str()) {
                warn!("More than one declaration maps to {}", unit.file_name);
                diagnostics.push(Diagnostic::DuplicateFileName {
                    file_name: unit.file_name.clone(),
                    offset: unit.span.start,
                });
            }
        }

        debug!(
            "Split into {} unit(s), {} diagnostic(s)",
            units.len(),
            diagnostics.len()
        );

        Ok(SplitOutcome::Split(SplitReport {
            header,
            units,
            candidates: reports,
            diagnostics,
        }))
    }
}

/// Scan every candidate's body and classify it.
///
/// Returns the accepted candidates as `(index into reports, body)` in source
/// order. Accepted candidates carry a placeholder outcome that the caller
/// replaces once the unit is built.
fn resolve_spans(
    text: &str,
    candidates: Vec<DeclarationCandidate>,
) -> (Vec<(usize, BodySpan)>, Vec<CandidateReport>) {
    let mut accepted: Vec<(usize, BodySpan)> = Vec::new();
    let mut reports: Vec<CandidateReport> = Vec::with_capacity(candidates.len());
    // brace depth stops being meaningful once a body failed to balance
    let mut depth_trusted = true;

    for (index, candidate) in candidates.iter().enumerate() {
        let enclosing = accepted.iter().find(|(i, body)| {
            candidate.start > candidates[*i].start && candidate.start < body.end
        });

        let outcome = if let Some((i, _)) = enclosing {
            trace!("'{}' is nested in '{}'", candidate.name, candidates[*i].name);
            CandidateOutcome::Nested {
                within: Some(candidates[*i].name.clone()),
            }
        } else if depth_trusted && !candidate.is_top_level() {
            trace!("'{}' is nested at depth {}", candidate.name, candidate.depth);
            CandidateOutcome::Nested { within: None }
        } else {
            let boundary = candidates[index + 1..]
                .iter()
                .find(|next| next.depth <= candidate.depth)
                .map(|next| next.start);

            match scan_body(text, candidate.header_end, boundary) {
                Ok(body) => {
                    accepted.push((reports.len(), body));
                    CandidateOutcome::Extracted {
                        span: candidate.start..body.end,
                    }
                }
                Err(reason) => {
                    warn!(
                        "Skipping malformed declaration '{}' at {}: {}",
                        candidate.name, candidate.start, reason
                    );
                    depth_trusted = false;
                    CandidateOutcome::Malformed(Error::malformed(
                        candidate.name.clone(),
                        candidate.start,
                        reason,
                    ))
                }
            }
        };

        reports.push(CandidateReport {
            candidate: candidate.clone(),
            outcome,
        });
    }

    (accepted, reports)
}

/// First code character outside the header and every unit span
fn uncovered_code(text: &str, header_end: usize, units: &[OutputUnit]) -> Option<usize> {
    let mut cursor = header_end;
    for unit in units {
        if cursor < unit.span.start {
            if let Some(offset) = first_code_offset(text, cursor..unit.span.start) {
                return Some(offset);
            }
        }
        cursor = cursor.max(unit.span.end);
    }
    first_code_offset(text, cursor..text.len())
}
