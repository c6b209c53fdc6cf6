//! One row of a standard definition table

use crate::error::{OdimError, Result};
use std::fmt;

/// Kind of object a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Group,
    Dataset,
    Attribute,
}

impl Category {
    /// Case-insensitive parse of `Group`, `Dataset` or `Attribute`
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "group" => Ok(Category::Group),
            "dataset" => Ok(Category::Dataset),
            "attribute" => Ok(Category::Attribute),
            other => Err(OdimError::InvalidEntry(format!(
                "unknown category '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Group => "Group",
            Category::Dataset => "Dataset",
            Category::Attribute => "Attribute",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared value type of an attribute rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Undefined,
    String,
    Real,
    Integer,
    StringArray,
    RealArray,
    IntegerArray,
    StringArray2D,
    RealArray2D,
    IntegerArray2D,
    Link,
}

impl EntryType {
    pub const ALL: [EntryType; 11] = [
        EntryType::Undefined,
        EntryType::String,
        EntryType::Real,
        EntryType::Integer,
        EntryType::StringArray,
        EntryType::RealArray,
        EntryType::IntegerArray,
        EntryType::StringArray2D,
        EntryType::RealArray2D,
        EntryType::IntegerArray2D,
        EntryType::Link,
    ];

    /// Parse the Type column.
    ///
    /// Matching is by substring on the lowercased text, so `"real array"`,
    /// `"Real Array"` and `"array of real"` are all [`EntryType::RealArray`].
    /// The legacy `boolean` type maps onto strings, which is how ODIM_H5
    /// stores `True`/`False`.
    pub fn parse(text: &str) -> Result<Self> {
        let lower = text.trim().to_ascii_lowercase();
        if lower.contains("link") {
            return Ok(EntryType::Link);
        }

        let two_d = lower.contains("2d");
        let array = two_d || lower.contains("array");

        let parsed = if lower.contains("string") || lower.contains("boolean") {
            match (array, two_d) {
                (_, true) => EntryType::StringArray2D,
                (true, false) => EntryType::StringArray,
                _ => EntryType::String,
            }
        } else if lower.contains("real") {
            match (array, two_d) {
                (_, true) => EntryType::RealArray2D,
                (true, false) => EntryType::RealArray,
                _ => EntryType::Real,
            }
        } else if lower.contains("integer") {
            match (array, two_d) {
                (_, true) => EntryType::IntegerArray2D,
                (true, false) => EntryType::IntegerArray,
                _ => EntryType::Integer,
            }
        } else {
            return Err(OdimError::InvalidEntry(format!(
                "unknown type '{}'",
                text.trim()
            )));
        };
        Ok(parsed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Undefined => "",
            EntryType::String => "string",
            EntryType::Real => "real",
            EntryType::Integer => "integer",
            EntryType::StringArray => "string array",
            EntryType::RealArray => "real array",
            EntryType::IntegerArray => "integer array",
            EntryType::StringArray2D => "string 2D array",
            EntryType::RealArray2D => "real 2D array",
            EntryType::IntegerArray2D => "integer 2D array",
            EntryType::Link => "link",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            EntryType::StringArray | EntryType::RealArray | EntryType::IntegerArray
        )
    }

    pub fn is_2d_array(&self) -> bool {
        matches!(
            self,
            EntryType::StringArray2D | EntryType::RealArray2D | EntryType::IntegerArray2D
        )
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule of a standard definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Regular expression over absolute paths
    pub node: String,
    pub category: Category,
    pub entry_type: EntryType,
    pub is_mandatory: bool,
    /// Constraint expression, empty when absent
    pub possible_values: String,
    /// Citation of the standard text, empty when absent
    pub reference: String,
}

impl Entry {
    pub fn new(node: impl Into<String>, category: Category, entry_type: EntryType) -> Self {
        let entry_type = match category {
            Category::Group | Category::Dataset => EntryType::Undefined,
            Category::Attribute => entry_type,
        };
        Entry {
            node: node.into(),
            category,
            entry_type,
            is_mandatory: false,
            possible_values: String::new(),
            reference: String::new(),
        }
    }

    pub fn group(node: impl Into<String>) -> Self {
        Self::new(node, Category::Group, EntryType::Undefined)
    }

    pub fn dataset(node: impl Into<String>) -> Self {
        Self::new(node, Category::Dataset, EntryType::Undefined)
    }

    pub fn attribute(node: impl Into<String>, entry_type: EntryType) -> Self {
        Self::new(node, Category::Attribute, entry_type)
    }

    pub fn mandatory(mut self, is_mandatory: bool) -> Self {
        self.is_mandatory = is_mandatory;
        self
    }

    pub fn with_values(mut self, possible_values: impl Into<String>) -> Self {
        self.possible_values = possible_values.into();
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn has_possible_values(&self) -> bool {
        !self.possible_values.is_empty()
    }

    /// Build an entry from the six table columns.
    ///
    /// Group and dataset rows ignore the Type column. Anything but a
    /// case-insensitive `true` in the mandatory column means optional.
    pub fn parse(
        node: &str,
        category: &str,
        entry_type: &str,
        is_mandatory: &str,
        possible_values: &str,
        reference: &str,
    ) -> Result<Self> {
        let node = node.trim();
        if node.is_empty() {
            return Err(OdimError::InvalidEntry("empty node".to_string()));
        }

        let category = Category::parse(category)?;
        let entry_type = match category {
            Category::Group | Category::Dataset => EntryType::Undefined,
            Category::Attribute => EntryType::parse(entry_type)?,
        };

        Ok(Entry {
            node: node.to_string(),
            category,
            entry_type,
            is_mandatory: is_mandatory.trim().eq_ignore_ascii_case("true"),
            possible_values: possible_values.trim().to_string(),
            reference: reference.trim().to_string(),
        })
    }

    /// The six table columns, inverse of [`Entry::parse`]
    pub fn to_fields(&self) -> [String; 6] {
        [
            self.node.clone(),
            self.category.as_str().to_string(),
            self.entry_type.as_str().to_string(),
            if self.is_mandatory { "TRUE" } else { "FALSE" }.to_string(),
            self.possible_values.clone(),
            self.reference.clone(),
        ]
    }

    /// Same rule bound to another node
    pub fn with_node(&self, node: impl Into<String>) -> Self {
        Entry {
            node: node.into(),
            ..self.clone()
        }
    }

    /// Identity used when layering tables: node, category and type
    pub fn same_rule(&self, other: &Entry) -> bool {
        self.node == other.node
            && self.category == other.category
            && self.entry_type == other.entry_type
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fields().join(";"))
    }
}
