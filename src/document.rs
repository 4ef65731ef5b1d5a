//! The document capability seam.
//!
//! The replacement engine never touches a container format. It sees a
//! document as an ordered collection of addressable text nodes behind the
//! [`TextDocument`] trait: body paragraphs first, then table paragraphs in
//! table → row → cell → paragraph order. Backends decide how text is
//! actually stored and rewritten.

use anyhow::{Result, bail};
use std::fmt;

/// Address of one text node inside a document.
///
/// The `Display` form is the location path recorded in audit entries,
/// e.g. `paragraph_3` or `table_0_row_1_cell_2_para_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeLocation {
    BodyParagraph {
        index: usize,
    },
    TableParagraph {
        table: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    },
}

impl NodeLocation {
    /// True for nodes living inside a table cell.
    pub fn in_table(&self) -> bool {
        matches!(self, NodeLocation::TableParagraph { .. })
    }
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeLocation::BodyParagraph { index } => write!(f, "paragraph_{index}"),
            NodeLocation::TableParagraph {
                table,
                row,
                cell,
                paragraph,
            } => write!(f, "table_{table}_row_{row}_cell_{cell}_para_{paragraph}"),
        }
    }
}

/// A loaded document exposing mutable text nodes.
///
/// Implementations own the document tree; the engine only reads and
/// rewrites node text and never restructures anything. `replace_node_text`
/// is expected to prefer a clear-runs-and-insert strategy and fall back to
/// direct assignment where the backing library requires it.
pub trait TextDocument {
    /// Node addresses in fixed traversal order: body paragraphs in
    /// document order, then tables → rows → cells → paragraphs.
    fn locations(&self) -> Vec<NodeLocation>;

    /// Current text of the node at `location`.
    fn node_text(&self, location: &NodeLocation) -> Result<String>;

    /// Overwrite the text of the node at `location`.
    fn replace_node_text(&mut self, location: &NodeLocation, text: &str) -> Result<()>;
}

/// In-memory document with the same traversal contract as the docx
/// backend. Used throughout the test suites.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    paragraphs: Vec<String>,
    /// table → row → cell → paragraphs
    tables: Vec<Vec<Vec<Vec<String>>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: paragraphs.into_iter().map(Into::into).collect(),
            tables: Vec::new(),
        }
    }

    /// Append a table given as rows of cells of paragraph texts.
    pub fn add_table(&mut self, rows: Vec<Vec<Vec<String>>>) {
        self.tables.push(rows);
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    fn cell_paragraph(&self, location: &NodeLocation) -> Option<&String> {
        match location {
            NodeLocation::BodyParagraph { index } => self.paragraphs.get(*index),
            NodeLocation::TableParagraph {
                table,
                row,
                cell,
                paragraph,
            } => self
                .tables
                .get(*table)?
                .get(*row)?
                .get(*cell)?
                .get(*paragraph),
        }
    }
}

impl TextDocument for MemoryDocument {
    fn locations(&self) -> Vec<NodeLocation> {
        let mut out = Vec::new();
        for index in 0..self.paragraphs.len() {
            out.push(NodeLocation::BodyParagraph { index });
        }
        for (table, rows) in self.tables.iter().enumerate() {
            for (row, cells) in rows.iter().enumerate() {
                for (cell, paragraphs) in cells.iter().enumerate() {
                    for paragraph in 0..paragraphs.len() {
                        out.push(NodeLocation::TableParagraph {
                            table,
                            row,
                            cell,
                            paragraph,
                        });
                    }
                }
            }
        }
        out
    }

    fn node_text(&self, location: &NodeLocation) -> Result<String> {
        match self.cell_paragraph(location) {
            Some(text) => Ok(text.clone()),
            None => bail!("no text node at {location}"),
        }
    }

    fn replace_node_text(&mut self, location: &NodeLocation, text: &str) -> Result<()> {
        let slot = match location {
            NodeLocation::BodyParagraph { index } => self.paragraphs.get_mut(*index),
            NodeLocation::TableParagraph {
                table,
                row,
                cell,
                paragraph,
            } => self
                .tables
                .get_mut(*table)
                .and_then(|rows| rows.get_mut(*row))
                .and_then(|cells| cells.get_mut(*cell))
                .and_then(|paragraphs| paragraphs.get_mut(*paragraph)),
        };
        match slot {
            Some(slot) => {
                *slot = text.to_string();
                Ok(())
            }
            None => bail!("no text node at {location}"),
        }
    }
}
