//! In-memory container tree
//!
//! A container is a tree of groups and datasets rooted at `/`, each object
//! carrying named attributes. Members and attributes are kept in name order so
//! every traversal is deterministic.

pub mod datatype;
pub mod file;
pub mod header;

pub use datatype::{AttrValue, Attribute, Dataspace, Datatype, StringPadding};
pub use file::{copy_verbatim, ContainerFile};

use crate::error::{OdimError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Group: attributes plus named members
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
    #[serde(default)]
    pub members: BTreeMap<String, Node>,
}

/// Dataset: typed array data plus attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub datatype: Datatype,
    pub dataspace: Dataspace,
    #[serde(default)]
    pub raw: Vec<u8>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl Dataset {
    /// Zero-filled dataset
    pub fn new(datatype: Datatype, dataspace: Dataspace) -> Result<Self> {
        let size = dataspace
            .element_count()?
            .checked_mul(datatype.element_size())
            .ok_or_else(|| match &dataspace {
                Dataspace::Simple(dims) => OdimError::DataspaceOverflow { dims: dims.clone() },
                Dataspace::Scalar => OdimError::DataspaceOverflow { dims: Vec::new() },
            })?;
        Ok(Dataset {
            datatype,
            dataspace,
            raw: vec![0u8; size],
            attributes: BTreeMap::new(),
        })
    }

    /// Two-dimensional unsigned 8-bit dataset, the usual ODIM_H5 data layout
    pub fn image(rows: u64, cols: u64) -> Result<Self> {
        Self::new(Datatype::UINT8, Dataspace::Simple(vec![rows, cols]))
    }
}

/// Tree member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Group(Group),
    Dataset(Dataset),
}

impl Node {
    fn attributes(&self) -> &BTreeMap<String, Attribute> {
        match self {
            Node::Group(g) => &g.attributes,
            Node::Dataset(d) => &d.attributes,
        }
    }

    fn attributes_mut(&mut self) -> &mut BTreeMap<String, Attribute> {
        match self {
            Node::Group(g) => &mut g.attributes,
            Node::Dataset(d) => &mut d.attributes,
        }
    }
}

/// Borrowed view of an object in the tree
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef<'a> {
    Group(&'a Group),
    Dataset(&'a Dataset),
}

impl<'a> ObjectRef<'a> {
    pub fn attributes(&self) -> &'a BTreeMap<String, Attribute> {
        match self {
            ObjectRef::Group(g) => &g.attributes,
            ObjectRef::Dataset(d) => &d.attributes,
        }
    }
}

/// Whole container tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    root: Group,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Look up a group or dataset by absolute path
    pub fn object(&self, path: &str) -> Option<ObjectRef<'_>> {
        let mut current = &self.root;
        let parts = segments(path);
        let last = parts.len();
        for (i, part) in parts.into_iter().enumerate() {
            match current.members.get(part)? {
                Node::Group(g) => current = g,
                Node::Dataset(d) if i + 1 == last => return Some(ObjectRef::Dataset(d)),
                Node::Dataset(_) => return None,
            }
        }
        Some(ObjectRef::Group(current))
    }

    pub fn group(&self, path: &str) -> Option<&Group> {
        match self.object(path)? {
            ObjectRef::Group(g) => Some(g),
            ObjectRef::Dataset(_) => None,
        }
    }

    pub fn dataset(&self, path: &str) -> Option<&Dataset> {
        match self.object(path)? {
            ObjectRef::Dataset(d) => Some(d),
            ObjectRef::Group(_) => None,
        }
    }

    /// Look up an attribute by its full path (`/object/path/name`)
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let (parent, name) = split_path(path)?;
        self.object(parent)?.attributes().get(name)
    }

    /// Create a group and any missing intermediate groups.
    ///
    /// Returns `true` if at least one group was created.
    pub fn create_group(&mut self, path: &str) -> Result<bool> {
        let mut current = &mut self.root;
        let mut created = false;
        for part in segments(path) {
            if !current.members.contains_key(part) {
                current
                    .members
                    .insert(part.to_string(), Node::Group(Group::default()));
                created = true;
            }
            current = match current.members.get_mut(part) {
                Some(Node::Group(g)) => g,
                _ => {
                    return Err(OdimError::WrongType {
                        path: path.to_string(),
                        expected: "a group path (a dataset is in the way)".to_string(),
                    })
                }
            };
        }
        Ok(created)
    }

    /// Insert a dataset, creating missing parent groups
    pub fn insert_dataset(&mut self, path: &str, dataset: Dataset) -> Result<()> {
        let (parent, name) = split_path(path).ok_or_else(|| OdimError::NotFound(path.to_string()))?;
        self.create_group(parent)?;
        let group = self
            .group_mut(parent)
            .ok_or_else(|| OdimError::NotFound(parent.to_string()))?;
        group
            .members
            .insert(name.to_string(), Node::Dataset(dataset));
        Ok(())
    }

    /// Create or replace an attribute; the owning object must exist
    pub fn set_attribute(&mut self, path: &str, attribute: Attribute) -> Result<Option<Attribute>> {
        let (parent, name) = split_path(path).ok_or_else(|| OdimError::NotFound(path.to_string()))?;
        let attributes = self
            .attributes_mut(parent)
            .ok_or_else(|| OdimError::NotFound(parent.to_string()))?;
        Ok(attributes.insert(name.to_string(), attribute))
    }

    pub fn remove_attribute(&mut self, path: &str) -> Option<Attribute> {
        let (parent, name) = split_path(path)?;
        self.attributes_mut(parent)?.remove(name)
    }

    /// All groups and datasets in pre-order, root first, members by name
    pub fn walk(&self) -> Vec<(String, ObjectRef<'_>)> {
        let mut out = vec![("/".to_string(), ObjectRef::Group(&self.root))];
        walk_group(&self.root, "/", &mut out);
        out
    }

    fn group_mut(&mut self, path: &str) -> Option<&mut Group> {
        let mut current = &mut self.root;
        for part in segments(path) {
            current = match current.members.get_mut(part)? {
                Node::Group(g) => g,
                Node::Dataset(_) => return None,
            };
        }
        Some(current)
    }

    fn attributes_mut(&mut self, path: &str) -> Option<&mut BTreeMap<String, Attribute>> {
        let parts = segments(path);
        let Some((last, parents)) = parts.split_last() else {
            return Some(&mut self.root.attributes);
        };
        let mut current = &mut self.root;
        for part in parents {
            current = match current.members.get_mut(*part)? {
                Node::Group(g) => g,
                Node::Dataset(_) => return None,
            };
        }
        current.members.get_mut(*last).map(Node::attributes_mut)
    }
}

fn walk_group<'a>(group: &'a Group, path: &str, out: &mut Vec<(String, ObjectRef<'a>)>) {
    for (name, node) in &group.members {
        let child = join_path(path, name);
        match node {
            Node::Group(g) => {
                out.push((child.clone(), ObjectRef::Group(g)));
                walk_group(g, &child, out);
            }
            Node::Dataset(d) => out.push((child, ObjectRef::Dataset(d))),
        }
    }
}

/// Non-empty path segments
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Split `/a/b/name` into (`/a/b`, `name`); the parent of a top-level name is `/`
pub fn split_path(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let idx = trimmed.rfind('/')?;
    let name = &trimmed[idx + 1..];
    if name.is_empty() {
        return None;
    }
    let parent = if idx == 0 { "/" } else { &trimmed[..idx] };
    Some((parent, name))
}

/// Join a parent path and a member name
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}
