//! Compliance checking of a container against a standard definition
//!
//! [`compare`] walks the rules in order and reports every missing mandatory
//! entry, wrongly typed attribute and unacceptable value. The result is the
//! overall verdict; only configuration and container access problems are
//! errors.

use crate::container::{join_path, AttrValue, Datatype};
use crate::error::{OdimError, Result};
use crate::expr::check_value;
use crate::pattern::{ancestor, split_before_leaf, PathMatcher};
use crate::report::Verbosity;
use crate::standard::{Category, Entry, EntryType, Ruleset};
use crate::store::{AttributeStore, MatchSet, StoreReader, StoreSnapshot};
use std::collections::HashSet;
use std::path::Path;

/// Class attribute required on 8-bit image datasets
pub const IMAGE_CLASS: &str = "IMAGE";
/// Image version attribute required on 8-bit image datasets
pub const IMAGE_VERSION: &str = "1.2";

/// What a compliance pass looks at and how much it reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOptions {
    /// Also check optional entries
    pub check_optional: bool,
    /// Report content no rule documents
    pub check_extras: bool,
    pub verbosity: Verbosity,
}

/// Check `store` against `standard`.
///
/// Entries that fail are pushed to `failed` (bound to the concrete path that
/// failed), so the sink can be written out as a correction table.
pub fn compare<S: AttributeStore + ?Sized>(
    store: &S,
    snapshot: &StoreSnapshot,
    standard: &Ruleset,
    options: &CheckOptions,
    failed: Option<&mut Ruleset>,
) -> Result<bool> {
    let mut pass = Pass {
        store,
        snapshot,
        options,
        matcher: PathMatcher::default(),
        found: MatchSet::new(),
        failed,
        compliant: true,
    };

    for entry in standard.iter() {
        pass.check_entry(entry)?;
    }
    pass.check_parents(standard)?;
    if options.check_extras {
        pass.report_extras()?;
    }
    Ok(pass.compliant)
}

/// Open `path` read-only and [`compare`] it
pub fn validate_file<P: AsRef<Path>>(
    path: P,
    standard: &Ruleset,
    options: &CheckOptions,
    failed: Option<&mut Ruleset>,
) -> Result<bool> {
    let store = StoreReader::open(path)?;
    let snapshot = StoreSnapshot::capture(&*store);
    compare(&*store, &snapshot, standard, options, failed)
}

struct Pass<'a, S: ?Sized> {
    store: &'a S,
    snapshot: &'a StoreSnapshot,
    options: &'a CheckOptions,
    matcher: PathMatcher,
    found: MatchSet,
    failed: Option<&'a mut Ruleset>,
    compliant: bool,
}

impl<'a, S: AttributeStore + ?Sized> Pass<'a, S> {
    fn verbosity(&self) -> Verbosity {
        self.options.verbosity
    }

    fn fail(&mut self, entry: &Entry, node: &str, message: String) {
        self.verbosity().warn(message);
        self.compliant = false;
        if let Some(failed) = self.failed.as_deref_mut() {
            failed.push(entry.with_node(node));
        }
    }

    fn matching(&mut self, entry: &Entry) -> Result<Vec<usize>> {
        let snapshot = self.snapshot;
        let mut matched = Vec::new();
        for (index, record) in snapshot.records(entry.category).iter().enumerate() {
            if self.matcher.matches(&entry.node, &record.name)? {
                matched.push(index);
            }
        }
        Ok(matched)
    }

    fn check_entry(&mut self, entry: &Entry) -> Result<()> {
        let evaluated = self.options.check_optional || entry.is_mandatory;
        if !evaluated && !self.options.check_extras {
            return Ok(());
        }

        let matched = self.matching(entry)?;
        for index in &matched {
            self.found.mark(entry.category, *index);
        }
        if !evaluated {
            return Ok(());
        }

        if matched.is_empty() {
            if entry.is_mandatory {
                self.fail(
                    entry,
                    &entry.node,
                    format!("mandatory {} {} not found", kind(entry), entry.node),
                );
            } else {
                self.verbosity().info(format!(
                    "optional {} {} not found",
                    kind(entry),
                    entry.node
                ));
            }
            return Ok(());
        }

        let snapshot = self.snapshot;
        let records = snapshot.records(entry.category);
        for index in matched {
            let path = records[index].name.as_str();
            let problem = match entry.category {
                Category::Attribute => self.attribute_problem(entry, path)?,
                Category::Dataset => self.image_problem(path)?,
                Category::Group => None,
            };
            if let Some(message) = problem {
                self.fail(entry, path, message);
            }
        }
        Ok(())
    }

    fn attribute_problem(&self, entry: &Entry, path: &str) -> Result<Option<String>> {
        let outcome = (|| -> Result<Option<String>> {
            if let Some(problem) = datatype_problem(self.store, entry.entry_type, path)? {
                return Ok(Some(problem));
            }
            if !entry.has_possible_values() {
                return Ok(None);
            }
            let value = self.store.attribute_value(path)?;
            if check_value(path, &value, &entry.possible_values)? {
                Ok(None)
            } else {
                Ok(Some(format!(
                    "incorrect value of {}: '{}' does not satisfy '{}'",
                    path, value, entry.possible_values
                )))
            }
        })();

        match outcome {
            Err(e) if e.is_non_fatal() => Ok(Some(e.to_string())),
            other => other,
        }
    }

    /// 8-bit datasets must be tagged as images
    fn image_problem(&self, path: &str) -> Result<Option<String>> {
        if !self.store.is_unsigned_byte_dataset(path)? {
            return Ok(None);
        }
        let expect = |name: &str, wanted: &str| -> Option<String> {
            let attribute = join_path(path, name);
            match self.store.raw_attribute_value(&attribute) {
                Ok(AttrValue::String(s)) if s == wanted => None,
                Ok(other) => Some(format!("{}=\"{}\", expected \"{}\"", name, other, wanted)),
                Err(_) => Some(format!("{} missing, expected \"{}\"", name, wanted)),
            }
        };

        let problems: Vec<String> = [
            expect("CLASS", IMAGE_CLASS),
            expect("IMAGE_VERSION", IMAGE_VERSION),
        ]
        .into_iter()
        .flatten()
        .collect();

        if problems.is_empty() {
            Ok(None)
        } else {
            Ok(Some(format!(
                "8-bit dataset {} is not a proper image: {}",
                path,
                problems.join(", ")
            )))
        }
    }

    /// Every parent a wildcard rule could apply to must carry the entry
    fn check_parents(&mut self, standard: &Ruleset) -> Result<()> {
        for entry in standard.iter().filter(|e| e.is_mandatory) {
            let Some(split) = split_before_leaf(&entry.node) else {
                continue;
            };

            let snapshot = self.snapshot;
            let records = snapshot.records(entry.category);
            let satisfied: HashSet<String> = self
                .matching(entry)?
                .into_iter()
                .filter_map(|i| ancestor(&records[i].name, split.depth))
                .collect();
            if satisfied.is_empty() {
                continue;
            }

            let mut missing = Vec::new();
            for record in snapshot.objects() {
                if self.matcher.matches(&split.prefix, &record.name)?
                    && !satisfied.contains(&record.name)
                {
                    missing.push(record.name.clone());
                }
            }
            for parent in missing {
                let node = format!("{}{}", parent, split.suffix);
                self.fail(
                    entry,
                    &node,
                    format!("mandatory {} {} not found", kind(entry), node),
                );
            }
        }
        Ok(())
    }

    fn report_extras(&self) -> Result<()> {
        for category in [Category::Group, Category::Dataset, Category::Attribute] {
            for record in self.found.unmatched(self.snapshot, category) {
                self.verbosity().info(format!(
                    "undocumented {} {} found",
                    category.as_str().to_lowercase(),
                    record.name
                ));
                if category == Category::Attribute {
                    let attribute = self.store.attribute_info(&record.name)?;
                    let standard_type = attribute.dataspace.rank() == 0
                        && (attribute.datatype == Datatype::REAL64
                            || attribute.datatype == Datatype::INT64
                            || matches!(attribute.datatype, Datatype::String { .. }));
                    if !standard_type {
                        self.verbosity().info(format!(
                            "undocumented attribute {} has non-standard datatype {}",
                            record.name, attribute.datatype
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn kind(entry: &Entry) -> String {
    entry.category.as_str().to_lowercase()
}

/// Why the attribute at `path` does not have the datatype `entry_type` asks
/// for, if it does not.
pub fn datatype_problem<S: AttributeStore + ?Sized>(
    store: &S,
    entry_type: EntryType,
    path: &str,
) -> Result<Option<String>> {
    let attribute = store.attribute_info(path)?;
    let rank = attribute.dataspace.rank();

    let matches = match entry_type {
        EntryType::Undefined => true,
        EntryType::String => rank != 1 && store.is_fixed_length_string(path)?,
        EntryType::Real => rank != 1 && store.is_real64(path)?,
        EntryType::Integer => rank != 1 && store.is_int64(path)?,
        EntryType::StringArray => rank == 1 && store.is_string(path)?,
        EntryType::RealArray => rank == 1 && store.is_real64(path)?,
        EntryType::IntegerArray => rank == 1 && store.is_int64(path)?,
        EntryType::StringArray2D => rank == 2 && store.is_string(path)?,
        EntryType::RealArray2D => rank == 2 && store.is_real64(path)?,
        EntryType::IntegerArray2D => rank == 2 && store.is_int64(path)?,
        EntryType::Link => store.is_link(path)?,
    };

    if matches {
        Ok(None)
    } else {
        Ok(Some(format!(
            "non-standard datatype of {}: {} of rank {}, expected {}",
            path, attribute.datatype, rank, entry_type
        )))
    }
}

/// Check a single attribute against an assumed value expression.
///
/// With `expected` set, the attribute must also have that datatype.
pub fn check_attribute_value<S: AttributeStore + ?Sized>(
    store: &S,
    path: &str,
    assumed: &str,
    expected: Option<EntryType>,
    verbosity: Verbosity,
) -> Result<bool> {
    if !store.has_attribute(path) {
        return Err(OdimError::NotFound(path.to_string()));
    }

    if let Some(entry_type) = expected {
        let problem = match datatype_problem(store, entry_type, path) {
            Err(e) if e.is_non_fatal() => Some(e.to_string()),
            other => other?,
        };
        if let Some(problem) = problem {
            verbosity.warn(problem);
            return Ok(false);
        }
    }

    let value = store.raw_attribute_value(path)?;
    if check_value(path, &value, assumed)? {
        verbosity.info(format!("OK - the value of {} is {}", path, assumed));
        Ok(true)
    } else {
        verbosity.warn(format!(
            "the value of {} is not {}, it is {}",
            path, assumed, value
        ));
        Ok(false)
    }
}
