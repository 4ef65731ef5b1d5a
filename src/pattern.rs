//! Pattern sets: ordered search → replacement rules loaded from JSON.
//!
//! A pattern file is a JSON object whose keys are search patterns and whose
//! values are replacement templates. Object order is significant: patterns
//! are applied sequentially, so a later pattern sees the output of earlier
//! ones within the same text node.

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// Hard ceiling on the length of a single search pattern.
pub const MAX_SEARCH_LEN: usize = 1000;

/// How much of an offending pattern to show in a validation message.
const ISSUE_PREVIEW_LEN: usize = 50;

/// Whether search patterns are plain substrings or regular expressions.
///
/// The mode applies to the whole pattern set and is passed explicitly into
/// the engine, so sets with different modes can coexist in one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Literal,
    Regex,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Literal => write!(f, "literal"),
            MatchMode::Regex => write!(f, "regex"),
        }
    }
}

/// One search → replacement rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    pub search: String,
    pub replacement: String,
}

/// Ordered collection of replacement rules applied together to one document.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    entries: Vec<PatternEntry>,
    /// Search keys whose JSON value was not a string. They are excluded
    /// from application and surface only through the validator.
    rejected: Vec<String>,
}

impl PatternSet {
    pub fn new(entries: Vec<PatternEntry>) -> Self {
        Self {
            entries,
            rejected: Vec::new(),
        }
    }

    /// Parse a pattern set from a JSON object, preserving key order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(json).context("pattern file is not valid JSON")?;
        let map = value
            .as_object()
            .context("pattern file must be a JSON object of search -> replacement")?;

        let mut entries = Vec::with_capacity(map.len());
        let mut rejected = Vec::new();
        for (search, replacement) in map {
            match replacement.as_str() {
                Some(text) => entries.push(PatternEntry {
                    search: search.clone(),
                    replacement: text.to_string(),
                }),
                None => rejected.push(search.clone()),
            }
        }

        Ok(Self { entries, rejected })
    }

    /// Load a pattern set from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read pattern file: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("failed to parse pattern file: {}", path.display()))
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the set for problems without applying it.
    ///
    /// All checks run independently; nothing short-circuits. Under regex
    /// mode each search pattern must also compile, and the compiler
    /// diagnostic is included in the message.
    pub fn validate(&self, mode: MatchMode) -> Vec<String> {
        let mut issues = Vec::new();

        for entry in &self.entries {
            if entry.search.trim().is_empty() {
                issues.push("empty search pattern found".to_string());
            }
            if entry.search.chars().count() > MAX_SEARCH_LEN {
                issues.push(format!(
                    "search pattern too long: {}...",
                    truncate_chars(&entry.search, ISSUE_PREVIEW_LEN)
                ));
            }
            if mode == MatchMode::Regex
                && let Err(e) = Regex::new(&entry.search)
            {
                issues.push(format!("invalid regex '{}': {e}", entry.search));
            }
        }

        for search in &self.rejected {
            issues.push(format!(
                "invalid replacement type for '{}': expected string",
                truncate_chars(search, ISSUE_PREVIEW_LEN)
            ));
        }

        issues
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Starter pattern file for literal mode: the legal-document token
/// migration map the tool ships with.
pub fn literal_preset() -> &'static str {
    r#"{
  "<<FileService.": "<<NewFileService.",
  "</ff>": "<<PAGE_BREAK>>",
  "</pp>": "<<HARD_RETURN>>",
  "<backspace>": "<<BACKSPACE>>",
  "<<STNDRDTH": "<<STANDARD_TH",
  "<c>": "<<CENTER>>",
  "<u>": "<<UNDERLINE>>",
  "<i>": "<<ITALIC>>",
  "<bold>": "<<BOLD>>",
  "</nobullet>": "<<NO_BULLET>>",
  "[[MCOMPUTEINTO(<<": "<<MCOMPUTE_INTO(",
  "[[SCOMPUTEINTO(": "<<SCOMPUTE_INTO(",
  "[[ABORTIIF": "<<ABORT_IF",
  "PROMTINTO(": "<<PROMPT_INTO(",
  "PROMTINTOIIF(": "<<PROMPT_INTO_IF(",
  "<<Checklist.": "<<CHECKLIST.",
  "TABLE(": "<<TABLE(",
  "<<jfig": "<<JFIG",
  "{ATTY": "<<ESIGN_ATTORNEY"
}"#
}

/// Starter pattern file for regex mode, using the `{{match}}` capture
/// placeholder in the replacement templates.
pub fn regex_preset() -> &'static str {
    r#"{
  "<<FileService\\.\\w*": "<<NewFileService.{{match}}",
  "<<BLTO\\d+": "<<BULLET_ORDERED_{{match}}>>",
  "<<BLT#\\d+": "<<BULLET_NUMBERED_{{match}}>>",
  "\\[\\[(\\w+)COMPUTEINTO\\(": "<<{{match}}_INTO(",
  "PROMT(\\w*)\\(": "<<PROMPT_{{match}}(",
  "<<Special\\.(\\w*)": "<<SPECIAL.{{match}}",
  "<<Tracker\\.(\\w+)>>~(\\w+):": "<<TRACKER.{{match}}_FORMAT>>",
  "\\{ATTY(\\w*)": "<<ESIGN_{{match}}",
  "<(\\w+)>": "<<{{match}}>>",
  "</(\\w+)>": "<<END_{{match}}>>",
  "[+-]\\d+\\|<<Special\\.ToDay:": "<<SPECIAL.DATE_OFFSET_{{match}}>>"
}"#
}
