//! Standard definition tables on disk: loading, layering and the
//! validate-then-correct round trip

mod common;

use common::{load, pvol, save};
use odimh5_rs::{
    correct, validate_file, AttrValue, Attribute, AttributeStore, CheckOptions, Dataspace,
    Datatype, EntryType, Ruleset, Verbosity,
};
use std::fs;
use tempfile::TempDir;

const TABLE: &str = "\
Node;Category;Type;IsMandatory;PossibleValues;Reference
# root
/Conventions;Attribute;string;TRUE;ODIM_H5/V2_[0-9];Table 1
/what;Group;;TRUE;;
/what/object;Attribute;string;TRUE;PVOL|SCAN;Table 2
/what/date;Attribute;string;TRUE;;Table 2
/where/lat;Attribute;real;TRUE;>=-90&&<=90;
/how/highprf;Attribute;integer;FALSE;>=0;Table 8
/dataset[1-9][0-9]*/where/elangle;Attribute;Real;TRUE;;Table 4
";

#[test]
fn test_read_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ODIM_H5_V2_2_PVOL.csv");
    fs::write(&path, TABLE).unwrap();

    let standard = Ruleset::read_csv(&path).unwrap();
    assert_eq!(standard.len(), 7);
    let highprf = standard.find("/how/highprf").unwrap();
    assert_eq!(highprf.entry_type, EntryType::Integer);
    assert!(!highprf.is_mandatory);
    assert_eq!(standard.find("/what").unwrap().entry_type, EntryType::Undefined);
    assert_eq!(
        standard.find("/dataset[1-9][0-9]*/where/elangle").unwrap().entry_type,
        EntryType::Real
    );
}

#[test]
fn test_values_layered_over_structure() {
    let dir = TempDir::new().unwrap();
    let structure = dir.path().join("structure.csv");
    fs::write(&structure, TABLE).unwrap();
    let values = dir.path().join("values.csv");
    fs::write(
        &values,
        "Node;Category;Type;IsMandatory;PossibleValues;Reference\n\
         /what/object;Attribute;string;TRUE;SCAN;\n\
         /how/extra;Attribute;real;FALSE;1.0;\n",
    )
    .unwrap();

    let mut standard = Ruleset::read_csv(&structure).unwrap();
    standard.update_with_csv(&values).unwrap();
    assert_eq!(standard.len(), 8);
    let object = standard.find("/what/object").unwrap();
    assert_eq!(object.possible_values, "SCAN");
    assert_eq!(object.reference, "Table 2");

    let source = save(dir.path(), "pvol.odh", &pvol());
    assert!(!validate_file(&source, &standard, &CheckOptions::default(), None).unwrap());
}

#[test]
fn test_malformed_row_names_its_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(
        &path,
        "Node;Category;Type;IsMandatory;PossibleValues;Reference\n\
         /what/object;Attribute;string;TRUE;;\n\
         /what/date;Thing;string;TRUE;;\n",
    )
    .unwrap();
    let err = Ruleset::read_csv(&path).unwrap_err();
    assert!(err.is_config_error());
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn test_failed_entries_feed_correction() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("standard.csv");
    fs::write(&table, TABLE).unwrap();
    let standard = Ruleset::read_csv(&table).unwrap();

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
    let source = save(dir.path(), "pvol.odh", &c);

    let options = CheckOptions {
        check_optional: true,
        verbosity: Verbosity::WarningsOnly,
        ..Default::default()
    };
    let mut failed = Ruleset::new();
    assert!(!validate_file(&source, &standard, &options, Some(&mut failed)).unwrap());

    let failed_path = dir.path().join("failed.csv");
    failed.write_csv(&failed_path).unwrap();
    let corrections = Ruleset::read_csv(&failed_path).unwrap();
    assert_eq!(corrections, failed);
    let highprf = corrections.find("/how/highprf").unwrap();
    assert_eq!(highprf.entry_type, EntryType::Integer);
    assert_eq!(highprf.possible_values, ">=0");
    assert_eq!(corrections.find("/what/object").unwrap().possible_values, "PVOL|SCAN");

    let target = dir.path().join("corrected.odh");
    correct(&source, &target, &corrections, Verbosity::WarningsOnly).unwrap();
    let repaired = load(&target);
    assert_eq!(
        repaired.attribute_info("/how/highprf").unwrap().datatype,
        Datatype::INT64
    );
    assert_eq!(
        repaired.attribute_value("/what/object").unwrap(),
        AttrValue::String("PVOL".into())
    );
    assert!(validate_file(&target, &standard, &options, None).unwrap());
}
