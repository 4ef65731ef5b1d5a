//! docxr: bulk find-and-replace for Word documents
//!
//! This library exposes the replacement engine, pattern sets, and the
//! document capability seam for use in integration and property-based
//! tests. The main binary is at src/main.rs.

pub mod batch;
pub mod cli;
pub mod config;
pub mod document;
pub mod docx;
pub mod engine;
pub mod logger;
pub mod pattern;
pub mod report;

// Re-export commonly used types for convenience
pub use batch::{BatchProcessor, RunMode, RunSummary, collect_documents};
pub use document::{MemoryDocument, NodeLocation, TextDocument};
pub use docx::DocxDocument;
pub use engine::{ProcessingResult, ReplacementRecord, apply, rewrite_text};
pub use pattern::{MatchMode, PatternEntry, PatternSet};
