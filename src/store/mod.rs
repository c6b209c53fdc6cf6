//! Attribute store contract
//!
//! The compliance and repair engines never touch the container tree directly.
//! They go through [`AttributeStore`] (enumeration, typed reads, datatype
//! predicates) and [`AttributeStoreMut`] (group creation, attribute writes).
//! [`Container`] implements both; [`StoreReader`] and [`StoreWriter`] are the
//! scoped file handles wrapping it.

mod handle;
pub mod snapshot;

pub use handle::{StoreReader, StoreWriter};
pub use snapshot::{MatchSet, PathRecord, StoreSnapshot};

use crate::container::{
    join_path, AttrValue, Attribute, Container, Datatype, ObjectRef,
};
use crate::error::{OdimError, Result};

/// Summary statistics of a numeric attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Statistics {
    /// `None` for an empty slice
    pub fn of(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let last = *values.last()?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Statistics {
            first,
            last,
            min,
            max,
            mean,
        })
    }
}

/// Read access to a container
pub trait AttributeStore {
    /// Group paths in traversal order, root `/` first
    fn groups(&self) -> Vec<String>;

    /// Dataset paths in traversal order
    fn datasets(&self) -> Vec<String>;

    /// Attribute paths: all group attributes (group by group), then all
    /// dataset attributes
    fn attributes(&self) -> Vec<String>;

    fn has_group(&self, path: &str) -> bool;
    fn has_dataset(&self, path: &str) -> bool;
    fn has_attribute(&self, path: &str) -> bool;

    /// Names of the attributes attached to a group or dataset
    fn attribute_names(&self, object_path: &str) -> Result<Vec<String>>;

    /// Stored datatype and dataspace of an attribute
    fn attribute_info(&self, path: &str) -> Result<&Attribute>;

    /// Storage datatype of a dataset
    fn dataset_datatype(&self, path: &str) -> Result<&Datatype>;

    /// Decoded value, rejecting non-standard string encodings with
    /// [`OdimError::BadEncoding`]
    fn attribute_value(&self, path: &str) -> Result<AttrValue> {
        let attribute = self.attribute_info(path)?;
        if let Some(reason) = attribute.encoding_issue() {
            return Err(OdimError::BadEncoding {
                path: path.to_string(),
                reason,
            });
        }
        attribute.decode(path)
    }

    /// Decoded value without standard-compliance checks
    fn raw_attribute_value(&self, path: &str) -> Result<AttrValue> {
        self.attribute_info(path)?.decode(path)
    }

    fn is_string(&self, path: &str) -> Result<bool> {
        Ok(self.attribute_info(path)?.datatype.is_string())
    }

    /// Fixed-length string; a size inconsistent with the content is reported
    /// as [`OdimError::BadEncoding`]
    fn is_fixed_length_string(&self, path: &str) -> Result<bool> {
        let attribute = self.attribute_info(path)?;
        match attribute.datatype {
            Datatype::String { .. } => match attribute.encoding_issue() {
                Some(reason) => Err(OdimError::BadEncoding {
                    path: path.to_string(),
                    reason,
                }),
                None => Ok(true),
            },
            _ => Ok(false),
        }
    }

    fn is_real64(&self, path: &str) -> Result<bool> {
        Ok(self.attribute_info(path)?.datatype == Datatype::REAL64)
    }

    fn is_int64(&self, path: &str) -> Result<bool> {
        Ok(self.attribute_info(path)?.datatype == Datatype::INT64)
    }

    fn is_boolean(&self, path: &str) -> Result<bool> {
        Ok(self.attribute_info(path)?.datatype.is_boolean())
    }

    fn is_1d_array(&self, path: &str) -> Result<bool> {
        Ok(self.attribute_info(path)?.dataspace.rank() == 1)
    }

    fn is_2d_array(&self, path: &str) -> Result<bool> {
        Ok(self.attribute_info(path)?.dataspace.rank() == 2)
    }

    fn is_link(&self, path: &str) -> Result<bool> {
        Ok(self.attribute_info(path)?.datatype == Datatype::Reference)
    }

    fn is_unsigned_byte_dataset(&self, path: &str) -> Result<bool> {
        Ok(*self.dataset_datatype(path)? == Datatype::UINT8)
    }

    /// first/last/min/max/mean of a numeric attribute; a scalar yields five
    /// equal values
    fn attribute_statistics(&self, path: &str) -> Result<Statistics> {
        let value = self.raw_attribute_value(path)?;
        let values = value.to_reals().ok_or_else(|| OdimError::WrongType {
            path: path.to_string(),
            expected: "numeric".to_string(),
        })?;
        Statistics::of(&values).ok_or_else(|| OdimError::WrongType {
            path: path.to_string(),
            expected: "a non-empty array".to_string(),
        })
    }
}

/// Write access to a container
pub trait AttributeStoreMut: AttributeStore {
    /// Create a group (and missing parents); `Ok(false)` if it already existed
    fn create_group(&mut self, path: &str) -> Result<bool>;

    /// Delete any existing attribute at `path` and write `value` under the
    /// canonical encoding
    fn write_attribute(&mut self, path: &str, value: &AttrValue) -> Result<()>;
}

impl AttributeStore for Container {
    fn groups(&self) -> Vec<String> {
        self.walk()
            .into_iter()
            .filter(|(_, object)| matches!(object, ObjectRef::Group(_)))
            .map(|(path, _)| path)
            .collect()
    }

    fn datasets(&self) -> Vec<String> {
        self.walk()
            .into_iter()
            .filter(|(_, object)| matches!(object, ObjectRef::Dataset(_)))
            .map(|(path, _)| path)
            .collect()
    }

    fn attributes(&self) -> Vec<String> {
        let objects = self.walk();
        let groups = objects
            .iter()
            .filter(|(_, object)| matches!(object, ObjectRef::Group(_)));
        let datasets = objects
            .iter()
            .filter(|(_, object)| matches!(object, ObjectRef::Dataset(_)));

        groups
            .chain(datasets)
            .flat_map(|(path, object)| {
                object
                    .attributes()
                    .keys()
                    .map(move |name| join_path(path, name))
            })
            .collect()
    }

    fn has_group(&self, path: &str) -> bool {
        self.group(path).is_some()
    }

    fn has_dataset(&self, path: &str) -> bool {
        self.dataset(path).is_some()
    }

    fn has_attribute(&self, path: &str) -> bool {
        self.attribute(path).is_some()
    }

    fn attribute_names(&self, object_path: &str) -> Result<Vec<String>> {
        let object = self
            .object(object_path)
            .ok_or_else(|| OdimError::NotFound(object_path.to_string()))?;
        Ok(object.attributes().keys().cloned().collect())
    }

    fn attribute_info(&self, path: &str) -> Result<&Attribute> {
        self.attribute(path)
            .ok_or_else(|| OdimError::NotFound(path.to_string()))
    }

    fn dataset_datatype(&self, path: &str) -> Result<&Datatype> {
        self.dataset(path)
            .map(|d| &d.datatype)
            .ok_or_else(|| OdimError::NotFound(path.to_string()))
    }
}

impl AttributeStoreMut for Container {
    fn create_group(&mut self, path: &str) -> Result<bool> {
        Container::create_group(self, path)
    }

    fn write_attribute(&mut self, path: &str, value: &AttrValue) -> Result<()> {
        self.remove_attribute(path);
        self.set_attribute(path, Attribute::canonical(value))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Dataset, Dataspace, StringPadding};

    fn sample() -> Container {
        let mut c = Container::new();
        c.create_group("/what").unwrap();
        c.create_group("/how").unwrap();
        c.create_group("/dataset1/data1").unwrap();
        c.insert_dataset("/dataset1/data1/data", Dataset::image(4, 4).unwrap())
            .unwrap();
        c.set_attribute("/Conventions", Attribute::string("ODIM_H5/V2_1"))
            .unwrap();
        c.set_attribute("/what/object", Attribute::string("PVOL"))
            .unwrap();
        c.set_attribute("/how/beamwidth", Attribute::real(1.0)).unwrap();
        c.set_attribute(
            "/how/highprf",
            Attribute::encode(
                Datatype::FixedPoint {
                    size: 4,
                    signed: true,
                },
                Dataspace::Scalar,
                &AttrValue::I64(600),
            )
            .unwrap(),
        )
        .unwrap();
        c.set_attribute(
            "/how/elangles",
            Attribute::canonical(&AttrValue::F64Array(vec![0.5, 1.5, 4.0])),
        )
        .unwrap();
        c.set_attribute("/dataset1/data1/data/CLASS", Attribute::string("IMAGE"))
            .unwrap();
        c
    }

    #[test]
    fn test_enumeration_order() {
        let c = sample();
        assert_eq!(
            c.groups(),
            vec!["/", "/dataset1", "/dataset1/data1", "/how", "/what"]
        );
        assert_eq!(c.datasets(), vec!["/dataset1/data1/data"]);
        assert_eq!(
            c.attributes(),
            vec![
                "/Conventions",
                "/how/beamwidth",
                "/how/elangles",
                "/how/highprf",
                "/what/object",
                "/dataset1/data1/data/CLASS",
            ]
        );
    }

    #[test]
    fn test_predicates() {
        let c = sample();
        assert!(c.is_real64("/how/beamwidth").unwrap());
        assert!(!c.is_int64("/how/highprf").unwrap());
        assert!(c.is_fixed_length_string("/what/object").unwrap());
        assert!(c.is_1d_array("/how/elangles").unwrap());
        assert!(!c.is_2d_array("/how/elangles").unwrap());
        assert!(c.is_unsigned_byte_dataset("/dataset1/data1/data").unwrap());
        assert!(matches!(
            c.is_real64("/how/nothing"),
            Err(OdimError::NotFound(_))
        ));
    }

    #[test]
    fn test_bad_string_size_is_non_fatal() {
        let mut c = sample();
        c.set_attribute(
            "/what/object",
            Attribute::encode(
                Datatype::String {
                    size: 10,
                    padding: StringPadding::NullTerminate,
                },
                Dataspace::Scalar,
                &AttrValue::String("PVOL".into()),
            )
            .unwrap(),
        )
        .unwrap();

        let err = c.attribute_value("/what/object").unwrap_err();
        assert!(err.is_non_fatal());
        assert!(c.is_fixed_length_string("/what/object").unwrap_err().is_non_fatal());
        assert_eq!(
            c.raw_attribute_value("/what/object").unwrap(),
            AttrValue::String("PVOL".into())
        );
    }

    #[test]
    fn test_statistics() {
        let c = sample();
        let stats = c.attribute_statistics("/how/elangles").unwrap();
        assert_eq!(stats.first, 0.5);
        assert_eq!(stats.last, 4.0);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 4.0);
        assert!((stats.mean - 2.0).abs() < f64::EPSILON);

        let scalar = c.attribute_statistics("/how/beamwidth").unwrap();
        assert_eq!(scalar.first, scalar.mean);
        assert!(c.attribute_statistics("/what/object").is_err());
    }

    #[test]
    fn test_write_attribute_replaces_encoding() {
        let mut c = sample();
        c.write_attribute("/how/highprf", &AttrValue::I64(600))
            .unwrap();
        assert!(c.is_int64("/how/highprf").unwrap());
        assert_eq!(c.attribute_value("/how/highprf").unwrap(), AttrValue::I64(600));
    }

    #[test]
    fn test_attribute_names() {
        let c = sample();
        assert_eq!(
            c.attribute_names("/how").unwrap(),
            vec!["beamwidth", "elangles", "highprf"]
        );
        assert_eq!(
            c.attribute_names("/dataset1/data1/data").unwrap(),
            vec!["CLASS"]
        );
        assert!(c.attribute_names("/nothing").is_err());
    }
}
