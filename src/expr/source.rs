//! Structured checks of the `/what/source` identifier
//!
//! The value is a comma-separated list of `PREFIX:value` pairs such as
//! `WMO:11812,RAD:SK41,PLC:Maly Javornik,NOD:skjav`. Each pair is checked
//! against the pattern its prefix allows.

use crate::pattern::anchored;

/// Attribute holding the source identifier
pub const SOURCE_PATH: &str = "/what/source";

const IDENTIFIERS: &[(&str, &str)] = &[
    ("WMO", "[0-9]{5}"),
    ("RAD", "[A-Z]{2}[A-Za-z0-9]{2,3}"),
    ("OPERA", "[A-Za-z0-9]{4,5}"),
    ("PLC", ".+"),
    ("NOD", "[a-z]{2}[a-z0-9]{3}"),
    ("ORG", "[0-9]+"),
    ("CTY", "[0-9]+"),
    ("CMT", ".*"),
    ("WIGOS", "[0-9]+-[0-9]+-[0-9]+-[A-Za-z0-9]{1,16}"),
];

/// Problems found in a source identifier, empty when it is well formed
pub fn source_problems(value: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if value.trim().is_empty() {
        problems.push("empty source identifier".to_string());
        return problems;
    }

    for component in value.split(',') {
        let Some((prefix, identifier)) = component.split_once(':') else {
            problems.push(format!("'{}' is not of the form PREFIX:value", component));
            continue;
        };
        let Some((_, pattern)) = IDENTIFIERS.iter().find(|(p, _)| *p == prefix) else {
            problems.push(format!("unknown source prefix '{}'", prefix));
            continue;
        };
        // patterns above are fixed and always compile
        let valid = anchored(pattern).map(|re| re.is_match(identifier)).unwrap_or(false);
        if !valid {
            problems.push(format!(
                "{}:{} does not match {}",
                prefix, identifier, pattern
            ));
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_source() {
        assert!(source_problems("WMO:11812,RAD:SK41,PLC:Maly Javornik,NOD:skjav").is_empty());
        assert!(source_problems("NOD:fikor,WIGOS:0-246-0-101234").is_empty());
    }

    #[test]
    fn test_unknown_prefix() {
        let problems = source_problems("WMO:11812,XYZ:1");
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("XYZ"));
    }

    #[test]
    fn test_bad_identifier() {
        assert_eq!(source_problems("WMO:118").len(), 1);
        assert_eq!(source_problems("NOD:SKJAV").len(), 1);
        assert_eq!(source_problems("WMO11812").len(), 1);
        assert_eq!(source_problems("").len(), 1);
    }
}
