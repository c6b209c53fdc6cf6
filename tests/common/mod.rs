//! Shared fixtures: a small polar volume and the matching rule tables

#![allow(dead_code)]

use odimh5_rs::{
    AttrValue, Attribute, Container, ContainerFile, Dataspace, Datatype, Entry, EntryType,
    Ruleset,
};
use std::path::{Path, PathBuf};

/// Polar volume with two sweeps and one quantity each
pub fn pvol() -> Container {
    let mut c = Container::new();
    c.set_attribute("/Conventions", Attribute::string("ODIM_H5/V2_2"))
        .unwrap();
    for group in ["/what", "/where", "/how"] {
        c.create_group(group).unwrap();
    }
    c.set_attribute("/what/object", Attribute::string("PVOL"))
        .unwrap();
    c.set_attribute("/what/version", Attribute::string("H5rad 2.2"))
        .unwrap();
    c.set_attribute("/what/date", Attribute::string("20180403"))
        .unwrap();
    c.set_attribute("/what/source", Attribute::string("WMO:11812,NOD:skjav"))
        .unwrap();
    c.set_attribute("/where/lat", Attribute::real(48.2561)).unwrap();
    c.set_attribute("/where/lon", Attribute::real(17.1531)).unwrap();
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

    for (ds, elangle) in [("/dataset1", 0.5), ("/dataset12", 1.5)] {
        c.create_group(&format!("{}/what", ds)).unwrap();
        c.create_group(&format!("{}/where", ds)).unwrap();
        c.set_attribute(&format!("{}/what/product", ds), Attribute::string("SCAN"))
            .unwrap();
        c.set_attribute(&format!("{}/where/elangle", ds), Attribute::real(elangle))
            .unwrap();
        c.create_group(&format!("{}/data1/what", ds)).unwrap();
        c.set_attribute(&format!("{}/data1/what/quantity", ds), Attribute::string("DBZH"))
            .unwrap();
    }
    c
}

/// Rules the fixture satisfies with the default options
pub fn pvol_standard() -> Ruleset {
    vec![
        Entry::attribute("/Conventions", EntryType::String)
            .mandatory(true)
            .with_values("ODIM_H5/V2_[0-9]"),
        Entry::group("/what").mandatory(true),
        Entry::attribute("/what/object", EntryType::String)
            .mandatory(true)
            .with_values(".*"),
        Entry::attribute("/what/date", EntryType::String)
            .mandatory(true)
            .with_values("[0-9]{8}"),
        Entry::attribute("/what/source", EntryType::String).mandatory(true),
        Entry::attribute("/where/lat", EntryType::Real)
            .mandatory(true)
            .with_values(">=-90&&<=90"),
        Entry::attribute("/where/lon", EntryType::Real)
            .mandatory(true)
            .with_values(">=-180&&<=180"),
        Entry::group("/dataset[1-9][0-9]*").mandatory(true),
        Entry::attribute("/dataset[1-9][0-9]*/what/product", EntryType::String)
            .mandatory(true)
            .with_values("SCAN"),
        Entry::attribute("/dataset[1-9][0-9]*/where/elangle", EntryType::Real)
            .mandatory(true)
            .with_values(">=-90&&<=90"),
        Entry::attribute(
            "/dataset[1-9][0-9]*/data[1-9][0-9]*/what/quantity",
            EntryType::String,
        )
        .mandatory(true),
        Entry::attribute("/how/beamwidth", EntryType::Real),
        Entry::attribute("/how/highprf", EntryType::Integer),
    ]
    .into_iter()
    .collect()
}

/// Save `container` as `name` inside `dir`
pub fn save(dir: &Path, name: &str, container: &Container) -> PathBuf {
    let path = dir.join(name);
    ContainerFile::new(&path).save(container).unwrap();
    path
}

pub fn load(path: &Path) -> Container {
    ContainerFile::new(path).load().unwrap()
}
