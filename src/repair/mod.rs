//! Repair of non-compliant containers
//!
//! [`correct`] copies the source container byte for byte and applies a table
//! of desired entries to the copy: missing groups are created, attributes
//! stored with a non-standard datatype are re-encoded with their current
//! value, and other attributes are written with their desired value. Every
//! node touched is listed in `/how/metadata_changed` of the target.

mod changelog;
mod desired;
mod expand;

pub use changelog::{ChangeLog, METADATA_CHANGED};
pub use desired::{coerce, desired_value, is_writable};
pub use expand::expand;

use crate::compliance::datatype_problem;
use crate::container::{copy_verbatim, split_path, AttrValue, Container};
use crate::error::{OdimError, Result};
use crate::pattern::PathMatcher;
use crate::report::Verbosity;
use crate::standard::{Category, Entry, Ruleset};
use crate::store::{AttributeStore, AttributeStoreMut, StoreReader, StoreSnapshot, StoreWriter};
use std::path::Path;
use tracing::debug;

/// Copy `source` to `target` and apply `desired` to the copy.
///
/// Returns the nodes changed by this run. On error, changes applied before
/// the failing entry remain in `target`; `source` is never modified.
pub fn correct<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    target: Q,
    desired: &Ruleset,
    verbosity: Verbosity,
) -> Result<ChangeLog> {
    let source = source.as_ref();
    let target = target.as_ref();
    check_supported(desired)?;

    let reader = StoreReader::open(source)?;
    let snapshot = StoreSnapshot::capture(&*reader);
    copy_verbatim(source, target)?;

    let entries = expand(&snapshot, desired, &mut PathMatcher::default())?;
    debug!(
        "{} desired entries bound to {} nodes",
        desired.len(),
        entries.len()
    );

    let mut writer = StoreWriter::open(target)?;
    let mut log = ChangeLog::new();
    for entry in &entries {
        if apply(&mut writer, entry, verbosity)? {
            log.record(entry.node.as_str());
        }
    }

    if !log.is_empty() {
        record_changes(&mut writer, &log)?;
    }
    writer.close()?;
    Ok(log)
}

/// Reject tables repair cannot act on before anything is written
fn check_supported(desired: &Ruleset) -> Result<()> {
    for entry in desired {
        match entry.category {
            Category::Dataset => {
                return Err(OdimError::Unsupported(format!(
                    "datasets cannot be corrected ({})",
                    entry.node
                )))
            }
            Category::Attribute if !is_writable(entry.entry_type) => {
                return Err(OdimError::Unsupported(format!(
                    "{} attributes cannot be corrected ({})",
                    entry.entry_type, entry.node
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Apply one concrete entry; `true` if the target changed
fn apply(writer: &mut StoreWriter, entry: &Entry, verbosity: Verbosity) -> Result<bool> {
    match entry.category {
        Category::Group => {
            if writer.has_group(&entry.node) {
                return Ok(false);
            }
            AttributeStoreMut::create_group(&mut **writer, &entry.node)?;
            verbosity.info(format!("group {} created", entry.node));
            Ok(true)
        }
        Category::Attribute => apply_attribute(writer, entry, verbosity),
        Category::Dataset => Err(OdimError::Unsupported(format!(
            "datasets cannot be corrected ({})",
            entry.node
        ))),
    }
}

fn apply_attribute(writer: &mut StoreWriter, entry: &Entry, verbosity: Verbosity) -> Result<bool> {
    let node = entry.node.as_str();

    if writer.has_attribute(node) {
        let problem = match datatype_problem(&**writer, entry.entry_type, node) {
            Err(e) if e.is_non_fatal() => Some(e.to_string()),
            other => other?,
        };
        // a wrongly stored value is kept and only re-encoded
        if let Some(problem) = problem {
            let value = coerce(entry, writer.raw_attribute_value(node)?)?;
            write(writer, node, &value)?;
            verbosity.info(format!("{}: rewritten as {}", problem, entry.entry_type));
            return Ok(true);
        }
        if !entry.has_possible_values() {
            return Ok(false);
        }
        let value = desired_value(entry)?;
        write(writer, node, &value)?;
        verbosity.info(format!("attribute {} set to {}", node, value));
        return Ok(true);
    }

    if !entry.has_possible_values() {
        return Err(OdimError::value(
            node,
            "",
            "the attribute is missing and no value was given",
        ));
    }
    let value = desired_value(entry)?;
    write(writer, node, &value)?;
    verbosity.info(format!("attribute {} created and set to {}", node, value));
    Ok(true)
}

/// Write an attribute, creating its owning group when it does not exist
fn write(writer: &mut StoreWriter, path: &str, value: &AttrValue) -> Result<()> {
    let container: &mut Container = writer;
    if let Some((parent, _)) = split_path(path) {
        if container.object(parent).is_none() {
            AttributeStoreMut::create_group(container, parent)?;
        }
    }
    container.write_attribute(path, value)
}

/// Merge `log` into the target's `/how/metadata_changed`
fn record_changes(writer: &mut StoreWriter, log: &ChangeLog) -> Result<()> {
    let previous = match writer.raw_attribute_value(METADATA_CHANGED) {
        Ok(AttrValue::String(text)) => ChangeLog::parse(&text),
        Ok(AttrValue::StringArray(items)) => items.into_iter().collect(),
        _ => ChangeLog::new(),
    };
    let merged = log.merged_after(&previous);
    write(writer, METADATA_CHANGED, &AttrValue::String(merged.joined()))?;
    debug!("{} now lists {} nodes", METADATA_CHANGED, merged.len());
    Ok(())
}
