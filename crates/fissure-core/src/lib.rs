//! # fissure-core
//!
//! A library for splitting source files that hold several exported types into
//! one self-contained unit per type.
//!
//! This crate provides the core functionality for:
//! - Tracking lexical context (code, comments, string and char literals)
//! - Finding where a declaration's body closes
//! - Locating declaration headers and telling top-level types from nested ones
//! - Rebuilding each unit with the file's package and import header
//!
//! ## Architecture
//!
//! - [`lexer`]: Lexical state machine and body scanning
//! - [`locate`]: Declaration header search and dialect tables
//! - [`header`]: Package and import extraction
//! - [`assemble`]: Output unit assembly
//! - [`split`]: The per-file pipeline
//! - [`error`]: Error types and handling
//!
//! The library does no I/O. Reading, writing and deleting files is left to
//! the caller.
//!
//! ## Example
//!
//! ```
//! use fissure_core::{Dialect, SplitOutcome, Splitter};
//!
//! let text = "package p;\nimport a.B;\n\npublic class X { }\npublic interface Y { }\n";
//!
//! let splitter = Splitter::for_dialect(Dialect::Java)?;
//! if let SplitOutcome::Split(report) = splitter.split(text)? {
//!     for unit in &report.units {
//!         println!("{}:\n{}", unit.file_name, unit.content);
//!     }
//!     assert!(report.is_clean());
//! }
//! # Ok::<(), fissure_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod assemble;
pub mod error;
pub mod header;
pub mod lexer;
pub mod locate;
pub mod split;

// Re-export primary types for convenience
pub use assemble::{assemble, OutputUnit};
pub use error::{Error, Result};
pub use header::{HeaderBlock, HeaderExtractor};
pub use lexer::{find_body_end, scan_body, BodySpan, LexMode, MalformedReason};
pub use locate::{DeclarationCandidate, DeclarationKind, Dialect, Locator, LocatorConfig};
pub use split::{
    CandidateOutcome, CandidateReport, Diagnostic, SplitOutcome, SplitReport, Splitter,
    SplitterConfig,
};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
