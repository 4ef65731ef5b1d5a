//! Word document backend on top of docx-rs.
//!
//! docx-rs owns the container format; this module only maps its document
//! tree onto the [`TextDocument`] capability. Paragraph text is the
//! concatenation of the run texts, and rewriting a node replaces all runs
//! with a single run carrying the new text. Paragraph-level properties
//! survive; run-level formatting inside a rewritten paragraph does not.

use crate::document::{NodeLocation, TextDocument};
use anyhow::{Context, Result, anyhow, bail};
use docx_rs::{
    DocumentChild, Docx, Paragraph, ParagraphChild, Run, RunChild, TableCellContent, TableChild,
    TableRowChild, read_docx,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A .docx file loaded into memory.
pub struct DocxDocument {
    docx: Docx,
    path: PathBuf,
}

impl DocxDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        let docx = read_docx(&bytes)
            .map_err(|e| anyhow!("failed to parse document {}: {e}", path.display()))?;
        Ok(Self {
            docx,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the document to `target`.
    ///
    /// The file is written next to the target and renamed into place, so a
    /// failed save never leaves a half-written document behind.
    pub fn save_to(self, target: &Path) -> Result<()> {
        let parent = target.parent().filter(|p| !p.as_os_str().is_empty());
        let temp = NamedTempFile::new_in(parent.unwrap_or(Path::new(".")))
            .with_context(|| format!("failed to create temp file for {}", target.display()))?;

        self.docx
            .build()
            .pack(temp.as_file())
            .with_context(|| format!("failed to write document {}", target.display()))?;

        temp.persist(target)
            .with_context(|| format!("failed to persist document {}", target.display()))?;
        Ok(())
    }

    fn body_paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(p.as_ref()),
                _ => None,
            })
            .nth(index)
    }

    fn body_paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.docx
            .document
            .children
            .iter_mut()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(p.as_mut()),
                _ => None,
            })
            .nth(index)
    }

    fn table_paragraph(
        &self,
        table: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    ) -> Option<&Paragraph> {
        let table = self
            .docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Table(t) => Some(t.as_ref()),
                _ => None,
            })
            .nth(table)?;
        let row = table
            .rows
            .iter()
            .map(|child| match child {
                TableChild::TableRow(row) => row,
            })
            .nth(row)?;
        let cell = row
            .cells
            .iter()
            .map(|child| match child {
                TableRowChild::TableCell(cell) => cell,
            })
            .nth(cell)?;
        cell.children
            .iter()
            .filter_map(|content| match content {
                TableCellContent::Paragraph(p) => Some(p.as_ref()),
                _ => None,
            })
            .nth(paragraph)
    }

    fn table_paragraph_mut(
        &mut self,
        table: usize,
        row: usize,
        cell: usize,
        paragraph: usize,
    ) -> Option<&mut Paragraph> {
        let table = self
            .docx
            .document
            .children
            .iter_mut()
            .filter_map(|child| match child {
                DocumentChild::Table(t) => Some(t.as_mut()),
                _ => None,
            })
            .nth(table)?;
        let row = table
            .rows
            .iter_mut()
            .map(|child| match child {
                TableChild::TableRow(row) => row,
            })
            .nth(row)?;
        let cell = row
            .cells
            .iter_mut()
            .map(|child| match child {
                TableRowChild::TableCell(cell) => cell,
            })
            .nth(cell)?;
        cell.children
            .iter_mut()
            .filter_map(|content| match content {
                TableCellContent::Paragraph(p) => Some(p.as_mut()),
                _ => None,
            })
            .nth(paragraph)
    }

    fn paragraph(&self, location: &NodeLocation) -> Option<&Paragraph> {
        match location {
            NodeLocation::BodyParagraph { index } => self.body_paragraph(*index),
            NodeLocation::TableParagraph {
                table,
                row,
                cell,
                paragraph,
            } => self.table_paragraph(*table, *row, *cell, *paragraph),
        }
    }

    fn paragraph_mut(&mut self, location: &NodeLocation) -> Option<&mut Paragraph> {
        match location {
            NodeLocation::BodyParagraph { index } => self.body_paragraph_mut(*index),
            NodeLocation::TableParagraph {
                table,
                row,
                cell,
                paragraph,
            } => self.table_paragraph_mut(*table, *row, *cell, *paragraph),
        }
    }
}

impl TextDocument for DocxDocument {
    fn locations(&self) -> Vec<NodeLocation> {
        let mut out = Vec::new();

        let mut index = 0usize;
        for child in &self.docx.document.children {
            if matches!(child, DocumentChild::Paragraph(_)) {
                out.push(NodeLocation::BodyParagraph { index });
                index += 1;
            }
        }

        let mut table_index = 0usize;
        for child in &self.docx.document.children {
            let DocumentChild::Table(table) = child else {
                continue;
            };
            for (row_index, row) in table.rows.iter().enumerate() {
                let TableChild::TableRow(row) = row;
                for (cell_index, cell) in row.cells.iter().enumerate() {
                    let TableRowChild::TableCell(cell) = cell;
                    let mut paragraph = 0usize;
                    for content in &cell.children {
                        if matches!(content, TableCellContent::Paragraph(_)) {
                            out.push(NodeLocation::TableParagraph {
                                table: table_index,
                                row: row_index,
                                cell: cell_index,
                                paragraph,
                            });
                            paragraph += 1;
                        }
                    }
                }
            }
            table_index += 1;
        }

        out
    }

    fn node_text(&self, location: &NodeLocation) -> Result<String> {
        match self.paragraph(location) {
            Some(paragraph) => Ok(paragraph_text(paragraph)),
            None => bail!("no text node at {location} in {}", self.path.display()),
        }
    }

    fn replace_node_text(&mut self, location: &NodeLocation, text: &str) -> Result<()> {
        let path = self.path.clone();
        match self.paragraph_mut(location) {
            Some(paragraph) => {
                set_paragraph_text(paragraph, text);
                Ok(())
            }
            None => bail!("no text node at {location} in {}", path.display()),
        }
    }
}

/// Concatenated text of all runs in a paragraph.
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

/// Clear the paragraph's runs and insert a single run with `text`.
/// Paragraph properties stay untouched.
fn set_paragraph_text(paragraph: &mut Paragraph, text: &str) {
    paragraph.children = vec![ParagraphChild::Run(Box::new(Run::new().add_text(text)))];
}
