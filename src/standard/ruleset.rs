//! Ordered collections of rules and their table representation
//!
//! Tables are semicolon-delimited with a header row and no quoting:
//!
//! ```text
//! Node;Category;Type;IsMandatory;PossibleValues;Reference
//! /what/object;Attribute;string;TRUE;PVOL|SCAN;Table 1
//! /how/highprf;Attribute;real;FALSE;;Table 8
//! ```
//!
//! The `PossibleValues` and `Reference` columns may be omitted.

use super::entry::Entry;
use crate::error::{OdimError, Result};
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "Node")]
    node: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Type", default)]
    entry_type: String,
    #[serde(rename = "IsMandatory", default)]
    is_mandatory: String,
    #[serde(rename = "PossibleValues", default)]
    possible_values: String,
    #[serde(rename = "Reference", default)]
    reference: String,
}

impl From<&Entry> for Row {
    fn from(entry: &Entry) -> Self {
        let [node, category, entry_type, is_mandatory, possible_values, reference] =
            entry.to_fields();
        Row {
            node,
            category,
            entry_type,
            is_mandatory,
            possible_values,
            reference,
        }
    }
}

/// Ordered list of rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset {
    entries: Vec<Entry>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// First entry with the given node
    pub fn find(&self, node: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.node == node)
    }

    /// Layer `overlay` on top of this ruleset.
    ///
    /// An overlay entry with the same node, category and type as an existing
    /// entry only replaces its possible values; anything else is appended.
    pub fn update(&mut self, overlay: &Ruleset) {
        for incoming in overlay.iter() {
            match self.entries.iter_mut().find(|e| e.same_rule(incoming)) {
                Some(existing) => existing.possible_values = incoming.possible_values.clone(),
                None => self.entries.push(incoming.clone()),
            }
        }
    }

    /// Load a table from `path`
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| OdimError::NotOpened {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let ruleset = Self::from_reader(file)?;
        debug!(
            "{} standard definition entries loaded from {}",
            ruleset.len(),
            path.display()
        );
        Ok(ruleset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .quoting(false)
            .trim(Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut ruleset = Ruleset::new();
        for (index, row) in reader.deserialize::<Row>().enumerate() {
            // header is line 1
            let line = index + 2;
            let row = row?;
            if row.node.is_empty() && row.category.is_empty() {
                continue;
            }
            let entry = Entry::parse(
                &row.node,
                &row.category,
                &row.entry_type,
                &row.is_mandatory,
                &row.possible_values,
                &row.reference,
            )
            .map_err(|e| OdimError::InvalidEntry(format!("line {}: {}", line, e)))?;
            ruleset.push(entry);
        }
        Ok(ruleset)
    }

    /// Layer the table at `path` over this ruleset (see [`Ruleset::update`])
    pub fn update_with_csv<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let overlay = Self::read_csv(path)?;
        self.update(&overlay);
        Ok(())
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| OdimError::NotOpened {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(b';')
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);
        for entry in &self.entries {
            writer.serialize(Row::from(entry))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<Entry> for Ruleset {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Ruleset {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Ruleset {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Ruleset {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Extend<Entry> for Ruleset {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
