//! Immutable listing of everything a container holds
//!
//! A snapshot is taken once per operation. Which records a rule has matched is
//! tracked separately in a [`MatchSet`] owned by the pass doing the matching.

use super::AttributeStore;
use crate::standard::Category;
use std::collections::HashSet;

/// One discovered group, dataset or attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRecord {
    pub name: String,
}

impl PathRecord {
    pub fn new(name: impl Into<String>) -> Self {
        PathRecord { name: name.into() }
    }
}

/// Ordered listing of groups, datasets and attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub groups: Vec<PathRecord>,
    pub datasets: Vec<PathRecord>,
    pub attributes: Vec<PathRecord>,
}

impl StoreSnapshot {
    pub fn capture<S: AttributeStore + ?Sized>(store: &S) -> Self {
        let records = |paths: Vec<String>| -> Vec<PathRecord> {
            paths.into_iter().map(PathRecord::new).collect()
        };
        let snapshot = StoreSnapshot {
            groups: records(store.groups()),
            datasets: records(store.datasets()),
            attributes: records(store.attributes()),
        };
        tracing::debug!(
            "{} groups, {} datasets and {} attributes found",
            snapshot.groups.len(),
            snapshot.datasets.len(),
            snapshot.attributes.len()
        );
        snapshot
    }

    /// Records of one category
    pub fn records(&self, category: Category) -> &[PathRecord] {
        match category {
            Category::Group => &self.groups,
            Category::Dataset => &self.datasets,
            Category::Attribute => &self.attributes,
        }
    }

    /// Groups followed by datasets
    pub fn objects(&self) -> impl Iterator<Item = &PathRecord> {
        self.groups.iter().chain(self.datasets.iter())
    }
}

/// Records matched by at least one rule during a pass
#[derive(Debug, Default)]
pub struct MatchSet {
    groups: HashSet<usize>,
    datasets: HashSet<usize>,
    attributes: HashSet<usize>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, category: Category, index: usize) {
        self.set_mut(category).insert(index);
    }

    pub fn is_marked(&self, category: Category, index: usize) -> bool {
        match category {
            Category::Group => self.groups.contains(&index),
            Category::Dataset => self.datasets.contains(&index),
            Category::Attribute => self.attributes.contains(&index),
        }
    }

    /// Records of `category` in `snapshot` no rule matched, in snapshot order
    pub fn unmatched<'a>(
        &self,
        snapshot: &'a StoreSnapshot,
        category: Category,
    ) -> Vec<&'a PathRecord> {
        snapshot
            .records(category)
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.is_marked(category, *i))
            .map(|(_, record)| record)
            .collect()
    }

    fn set_mut(&mut self, category: Category) -> &mut HashSet<usize> {
        match category {
            Category::Group => &mut self.groups,
            Category::Dataset => &mut self.datasets,
            Category::Attribute => &mut self.attributes,
        }
    }
}
