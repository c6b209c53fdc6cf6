//! Repair of containers on disk

mod common;

use common::{load, pvol, pvol_standard, save};
use odimh5_rs::{
    compare, correct, AttrValue, Attribute, AttributeStore, CheckOptions, Dataspace, Datatype,
    Entry, EntryType, Ruleset, StoreSnapshot, Verbosity, METADATA_CHANGED,
};
use std::fs;
use tempfile::TempDir;

const QUIET: Verbosity = Verbosity::WarningsOnly;

fn rules(entries: Vec<Entry>) -> Ruleset {
    entries.into_iter().collect()
}

fn changed_nodes(path: &std::path::Path) -> Vec<String> {
    match load(path).raw_attribute_value(METADATA_CHANGED).unwrap() {
        AttrValue::String(text) => text.split(',').map(str::to_string).collect(),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_narrow_integer_rewritten() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    let desired = rules(vec![Entry::attribute("/how/highprf", EntryType::Integer)]);
    let log = correct(&source, &target, &desired, QUIET).unwrap();
    assert_eq!(log.nodes(), &["/how/highprf"]);

    let repaired = load(&target);
    assert_eq!(
        repaired.attribute_info("/how/highprf").unwrap().datatype,
        Datatype::INT64
    );
    assert_eq!(
        repaired.attribute_value("/how/highprf").unwrap(),
        AttrValue::I64(600)
    );

    let options = CheckOptions {
        check_optional: true,
        ..Default::default()
    };
    let snapshot = StoreSnapshot::capture(&repaired);
    assert!(compare(&repaired, &snapshot, &pvol_standard(), &options, None).unwrap());
}

#[test]
fn test_wrong_type_coerced_despite_constraint() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    // a constraint is not a value to write; the stored 600 is kept
    let desired = rules(vec![
        Entry::attribute("/how/highprf", EntryType::Integer).with_values(">=0"),
    ]);
    let log = correct(&source, &target, &desired, QUIET).unwrap();
    assert_eq!(log.nodes(), &["/how/highprf"]);

    let repaired = load(&target);
    assert_eq!(
        repaired.attribute_info("/how/highprf").unwrap().datatype,
        Datatype::INT64
    );
    assert_eq!(
        repaired.attribute_value("/how/highprf").unwrap(),
        AttrValue::I64(600)
    );
}

#[test]
fn test_variable_length_string_keeps_value_not_pattern() {
    let dir = TempDir::new().unwrap();
    let mut c = pvol();
    c.set_attribute(
        "/what/object",
        Attribute::encode(
            Datatype::VariableLengthString,
            Dataspace::Scalar,
            &AttrValue::String("PVOL".into()),
        )
        .unwrap(),
    )
    .unwrap();
    let source = save(dir.path(), "in.odh", &c);
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::attribute("/what/object", EntryType::String).with_values("PVOL|SCAN"),
    ]);
    correct(&source, &target, &desired, QUIET).unwrap();

    let repaired = load(&target);
    assert!(repaired.is_fixed_length_string("/what/object").unwrap());
    assert_eq!(
        repaired.attribute_value("/what/object").unwrap(),
        AttrValue::String("PVOL".into())
    );
    assert_eq!(changed_nodes(&target), vec!["/what/object"]);
}

#[test]
fn test_constraint_on_correct_type_is_not_a_value() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    // beamwidth is already a 64-bit real, so the constraint must be written
    let desired = rules(vec![
        Entry::attribute("/how/beamwidth", EntryType::Real).with_values(">=0"),
    ]);
    let err = correct(&source, &target, &desired, QUIET).unwrap_err();
    assert!(err.is_config_error());
    assert_eq!(
        load(&target).attribute_value("/how/beamwidth").unwrap(),
        AttrValue::F64(1.0)
    );
}

#[test]
fn test_wildcard_group_with_attributes() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::group("/dataset[1-9][0-9]*/testGroup"),
        Entry::attribute("/dataset[1-9][0-9]*/testGroup/gain", EntryType::Real).with_values("0.5"),
        Entry::attribute("/dataset[1-9][0-9]*/testGroup/nbins", EntryType::Integer)
            .with_values("250"),
        Entry::attribute("/dataset[1-9][0-9]*/testGroup/label", EntryType::String)
            .with_values("test"),
    ]);
    correct(&source, &target, &desired, QUIET).unwrap();

    let repaired = load(&target);
    for ds in ["/dataset1", "/dataset12"] {
        assert!(repaired.has_group(&format!("{}/testGroup", ds)));
        let gain = format!("{}/testGroup/gain", ds);
        assert!(repaired.is_real64(&gain).unwrap());
        assert_eq!(repaired.attribute_value(&gain).unwrap(), AttrValue::F64(0.5));
        let nbins = format!("{}/testGroup/nbins", ds);
        assert!(repaired.is_int64(&nbins).unwrap());
        let label = format!("{}/testGroup/label", ds);
        assert!(repaired.is_fixed_length_string(&label).unwrap());
    }

    let changed = changed_nodes(&target);
    assert_eq!(changed.len(), 8);
    assert_eq!(changed[0], "/dataset1/testGroup");
    assert_eq!(changed[1], "/dataset12/testGroup");
}

#[test]
fn test_values_replaced_and_created() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::attribute("/how/beamwidth", EntryType::Real).with_values("=1.254+-0.002"),
        Entry::attribute("/how/wavelength", EntryType::Real).with_values(">5.0&&<6.0"),
        Entry::attribute("/how/elangles", EntryType::RealArray).with_values("0.5,1.5"),
        Entry::attribute("/what/object", EntryType::String).with_values("SCAN"),
    ]);
    correct(&source, &target, &desired, QUIET).unwrap();

    let repaired = load(&target);
    assert_eq!(
        repaired.attribute_value("/how/beamwidth").unwrap(),
        AttrValue::F64(1.254)
    );
    assert_eq!(
        repaired.attribute_value("/how/wavelength").unwrap(),
        AttrValue::F64(5.5)
    );
    assert_eq!(
        repaired.attribute_value("/how/elangles").unwrap(),
        AttrValue::F64Array(vec![0.5, 1.5])
    );
    assert!(repaired.is_1d_array("/how/elangles").unwrap());
    assert_eq!(
        repaired.attribute_value("/what/object").unwrap(),
        AttrValue::String("SCAN".into())
    );
}

#[test]
fn test_audit_keeps_previous_values() {
    let dir = TempDir::new().unwrap();
    let mut c = pvol();
    c.set_attribute(
        METADATA_CHANGED,
        odimh5_rs::Attribute::string("/how/system,/what/source"),
    )
    .unwrap();
    let source = save(dir.path(), "in.odh", &c);
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::attribute("/how/system2", EntryType::String).with_values("B"),
        Entry::attribute("/how/system", EntryType::String).with_values("A"),
        Entry::attribute("/how/system", EntryType::String).with_values("C"),
    ]);
    correct(&source, &target, &desired, QUIET).unwrap();

    assert_eq!(
        changed_nodes(&target),
        vec!["/how/system", "/what/source", "/how/system2"]
    );
    // first entry for a node wins
    assert_eq!(
        load(&target).attribute_value("/how/system").unwrap(),
        AttrValue::String("A".into())
    );
}

#[test]
fn test_audit_group_created_when_missing() {
    let dir = TempDir::new().unwrap();
    let mut c = odimh5_rs::Container::new();
    c.create_group("/what").unwrap();
    let source = save(dir.path(), "in.odh", &c);
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::attribute("/what/object", EntryType::String).with_values("PVOL"),
    ]);
    correct(&source, &target, &desired, QUIET).unwrap();
    assert_eq!(changed_nodes(&target), vec!["/what/object"]);
}

#[test]
fn test_source_untouched() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let before = fs::read(&source).unwrap();
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::group("/dataset[1-9][0-9]*/testGroup"),
        Entry::attribute("/how/highprf", EntryType::Integer),
    ]);
    correct(&source, &target, &desired, QUIET).unwrap();
    assert_eq!(fs::read(&source).unwrap(), before);
}

#[test]
fn test_nothing_to_do_leaves_copy_identical() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::group("/what"),
        Entry::attribute("/where/lat", EntryType::Real),
    ]);
    let log = correct(&source, &target, &desired, QUIET).unwrap();
    assert!(log.is_empty());
    assert_eq!(fs::read(&source).unwrap(), fs::read(&target).unwrap());
}

#[test]
fn test_failure_keeps_earlier_changes() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    let desired = rules(vec![
        Entry::group("/dataset[1-9][0-9]*/testGroup"),
        Entry::attribute("/how/frequency", EntryType::Real).with_values(">=5&&<6"),
        Entry::group("/never"),
    ]);
    let err = correct(&source, &target, &desired, QUIET).unwrap_err();
    assert!(err.is_config_error());

    let partial = load(&target);
    assert!(partial.has_group("/dataset1/testGroup"));
    assert!(partial.has_group("/dataset12/testGroup"));
    assert!(!partial.has_attribute("/how/frequency"));
    assert!(!partial.has_group("/never"));
}

#[test]
fn test_missing_attribute_without_value_is_fatal() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());
    let target = dir.path().join("out.odh");

    let desired = rules(vec![Entry::attribute("/how/frequency", EntryType::Real)]);
    assert!(correct(&source, &target, &desired, QUIET)
        .unwrap_err()
        .is_config_error());
}

#[test]
fn test_unsupported_entries_rejected_before_copy() {
    let dir = TempDir::new().unwrap();
    let source = save(dir.path(), "in.odh", &pvol());

    for entry in [
        Entry::dataset("/dataset1/data1/data"),
        Entry::attribute("/how/names", EntryType::StringArray).with_values("a,b"),
    ] {
        let target = dir.path().join("out.odh");
        let err = correct(&source, &target, &rules(vec![entry]), QUIET).unwrap_err();
        assert!(err.is_config_error());
        assert!(!target.exists());
    }
}

#[test]
fn test_source_must_be_a_container() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("in.odh");
    fs::write(&source, b"not a container").unwrap();
    let target = dir.path().join("out.odh");

    let err = correct(&source, &target, &Ruleset::new(), QUIET).unwrap_err();
    assert!(err.is_store_error());
    assert!(!target.exists());
}
