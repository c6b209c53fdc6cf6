use crate::error::Result;
use crate::pattern::{split_at_last_wildcard, PathMatcher};
use crate::standard::{Entry, Ruleset};
use crate::store::{PathRecord, StoreSnapshot};
use std::collections::HashSet;
use tracing::debug;

/// Bind wildcard entries to the concrete nodes of a container.
///
/// A pattern is cut after its last wildcard segment. Every object whose path
/// matches the cut prefix yields one entry with the literal suffix appended.
/// A pattern whose last segment is the wildcard is matched against records
/// of the entry's own category instead. The first entry for a node wins.
pub fn expand(
    snapshot: &StoreSnapshot,
    desired: &Ruleset,
    matcher: &mut PathMatcher,
) -> Result<Vec<Entry>> {
    let mut seen = HashSet::new();
    let mut concrete = Vec::new();
    let mut keep = |entry: Entry| {
        if seen.insert(entry.node.clone()) {
            concrete.push(entry);
        }
    };

    for entry in desired {
        let Some(split) = split_at_last_wildcard(&entry.node) else {
            keep(entry.clone());
            continue;
        };

        let candidates: Vec<&PathRecord> = if split.suffix.is_empty() {
            snapshot.records(entry.category).iter().collect()
        } else {
            snapshot.objects().collect()
        };

        let mut bound = 0;
        for record in candidates {
            if matcher.matches(&split.prefix, &record.name)? {
                keep(entry.with_node(format!("{}{}", record.name, split.suffix)));
                bound += 1;
            }
        }
        debug!("{} expanded to {} nodes", entry.node, bound);
    }
    Ok(concrete)
}
