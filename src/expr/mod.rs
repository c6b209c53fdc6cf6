//! Possible-values expressions
//!
//! Numeric attributes are checked with a small expression language:
//!
//! | expression                  | meaning                                  |
//! |-----------------------------|------------------------------------------|
//! | `600` or `=600` or `==600`  | equal (absolute tolerance 1e-6)          |
//! | `=1.254+-0.002`             | within `[1.252, 1.256]`                  |
//! | `>0.0&&<1.0`                | open interval                            |
//! | `==1\|\|==2`                | alternatives                             |
//! | `min>=0&&max<360`           | statistic of an array value              |
//!
//! String attributes are checked by matching the whole expression as a
//! regular expression against the full value.

mod eval;
mod lexer;
mod parser;
pub mod source;

pub use eval::EQUALITY_TOLERANCE;
pub use lexer::{Comparison, Statistic};
pub use parser::{Connective, Expression, Term};

use crate::container::AttrValue;
use crate::error::{OdimError, Result};
use crate::pattern::anchored;

/// Check a value read from `path` against a possible-values expression
pub fn check_value(path: &str, value: &AttrValue, expression: &str) -> Result<bool> {
    match value {
        AttrValue::String(text) => {
            let matched = matches_text(expression, text)?;
            if path == source::SOURCE_PATH {
                return Ok(matched && source::source_problems(text).is_empty());
            }
            Ok(matched)
        }
        AttrValue::StringArray(texts) => {
            for text in texts {
                if !matches_text(expression, text)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        numeric => {
            let values = numeric.to_reals().unwrap_or_default();
            Expression::parse(expression)?.evaluate(&values, numeric.is_array())
        }
    }
}

/// Full-string regular expression match
pub fn matches_text(expression: &str, text: &str) -> Result<bool> {
    let regex = anchored(expression).map_err(|e| OdimError::expression(expression, e.to_string()))?;
    Ok(regex.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_is_regex() {
        let value = AttrValue::String("PVOL".into());
        assert!(check_value("/what/object", &value, "PVOL|SCAN").unwrap());
        assert!(!check_value("/what/object", &value, "PVO").unwrap());
        assert!(check_value("/what/object", &value, "P.*").unwrap());
    }

    #[test]
    fn test_invalid_string_regex() {
        let value = AttrValue::String("PVOL".into());
        let err = check_value("/what/object", &value, "PVOL(").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_source_structure() {
        let good = AttrValue::String("WMO:11812,NOD:skjav".into());
        assert!(check_value("/what/source", &good, ".*").unwrap());
        let bad = AttrValue::String("WMO:11812,FOO:bar".into());
        assert!(!check_value("/what/source", &bad, ".*").unwrap());
        // only the source attribute gets the structured treatment
        assert!(check_value("/what/other", &bad, ".*").unwrap());
    }

    #[test]
    fn test_numeric_dispatch() {
        assert!(check_value("/how/highprf", &AttrValue::I64(600), "600").unwrap());
        assert!(check_value(
            "/how/elangles",
            &AttrValue::F64Array(vec![0.5, 1.5]),
            "min>=0.5&&max<=1.5"
        )
        .unwrap());
        assert!(check_value("/how/x", &AttrValue::F64Array(vec![0.5]), "0.5").is_err());
    }
}
