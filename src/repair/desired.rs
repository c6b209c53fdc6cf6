//! Turning correction values into attribute values

use crate::container::AttrValue;
use crate::error::{OdimError, Result};
use crate::expr::{Comparison, Connective, Expression, Term};
use crate::standard::{Entry, EntryType};

/// Attribute types repair can write
pub fn is_writable(entry_type: EntryType) -> bool {
    matches!(
        entry_type,
        EntryType::String
            | EntryType::Real
            | EntryType::Integer
            | EntryType::RealArray
            | EntryType::IntegerArray
    )
}

/// Value to write for an entry carrying a desired value.
///
/// Scalars accept a literal, `center+-tolerance` (the center is written) or
/// an open interval `>X&&<Y` (the midpoint is written, rounded for
/// integers). Arrays take a comma-separated list of literals.
pub fn desired_value(entry: &Entry) -> Result<AttrValue> {
    let text = entry.possible_values.trim();
    match entry.entry_type {
        EntryType::String => Ok(AttrValue::String(text.to_string())),
        EntryType::Real => Ok(AttrValue::F64(scalar(entry, text)?.0)),
        EntryType::Integer => {
            if let Ok(v) = text.parse::<i64>() {
                return Ok(AttrValue::I64(v));
            }
            let (value, midpoint) = scalar(entry, text)?;
            if midpoint {
                Ok(AttrValue::I64(value.round() as i64))
            } else {
                integral(entry, text, value).map(AttrValue::I64)
            }
        }
        EntryType::RealArray => list(entry, text, |item| item.parse::<f64>().ok())
            .map(AttrValue::F64Array),
        EntryType::IntegerArray => list(entry, text, |item| item.parse::<i64>().ok())
            .map(AttrValue::I64Array),
        other => Err(OdimError::Unsupported(format!(
            "cannot write {} attribute {}",
            other, entry.node
        ))),
    }
}

/// Re-express an existing value under the representation `entry` asks for
pub fn coerce(entry: &Entry, value: AttrValue) -> Result<AttrValue> {
    let node = entry.node.as_str();
    let shown = value.to_string();
    let mismatch = |reason: &str| OdimError::value(node, &shown, reason.to_string());

    match entry.entry_type {
        EntryType::String => match value {
            AttrValue::String(s) => Ok(AttrValue::String(s)),
            AttrValue::StringArray(mut v) if v.len() == 1 => Ok(AttrValue::String(v.remove(0))),
            AttrValue::F64(_) | AttrValue::I64(_) => Ok(AttrValue::String(shown.clone())),
            _ => Err(mismatch("cannot be stored as a string")),
        },
        EntryType::Real => match single_real(&value) {
            Some(v) => Ok(AttrValue::F64(v)),
            None => Err(mismatch("cannot be stored as a real")),
        },
        EntryType::Integer => match single_real(&value) {
            Some(v) => {
                if let AttrValue::I64(i) = value {
                    return Ok(AttrValue::I64(i));
                }
                integral(entry, &shown, v).map(AttrValue::I64)
            }
            None => Err(mismatch("cannot be stored as an integer")),
        },
        EntryType::RealArray => match value {
            AttrValue::String(_) | AttrValue::StringArray(_) => {
                Err(mismatch("cannot be stored as a real array"))
            }
            numeric => Ok(AttrValue::F64Array(numeric.to_reals().unwrap_or_default())),
        },
        EntryType::IntegerArray => match value {
            AttrValue::I64(i) => Ok(AttrValue::I64Array(vec![i])),
            AttrValue::I64Array(v) => Ok(AttrValue::I64Array(v)),
            AttrValue::F64(v) => Ok(AttrValue::I64Array(vec![integral(entry, &shown, v)?])),
            AttrValue::F64Array(values) => values
                .into_iter()
                .map(|v| integral(entry, &shown, v))
                .collect::<Result<Vec<_>>>()
                .map(AttrValue::I64Array),
            _ => Err(mismatch("cannot be stored as an integer array")),
        },
        other => Err(OdimError::Unsupported(format!(
            "cannot write {} attribute {}",
            other, node
        ))),
    }
}

fn single_real(value: &AttrValue) -> Option<f64> {
    match value {
        AttrValue::String(s) => s.trim().parse().ok(),
        AttrValue::StringArray(v) if v.len() == 1 => v[0].trim().parse().ok(),
        numeric => match numeric.to_reals()?.as_slice() {
            [single] => Some(*single),
            _ => None,
        },
    }
}

fn integral(entry: &Entry, text: &str, value: f64) -> Result<i64> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(OdimError::value(
            &entry.node,
            text,
            "not an integral value",
        ));
    }
    Ok(value as i64)
}

/// Scalar from a literal, `center+-tolerance` or `>X&&<Y`; the flag is set
/// when the value is an interval midpoint
fn scalar(entry: &Entry, text: &str) -> Result<(f64, bool)> {
    if let Ok(v) = text.parse::<f64>() {
        return Ok((v, false));
    }

    let expression = Expression::parse(text)
        .map_err(|e| OdimError::value(&entry.node, text, e.to_string()))?;
    let point = |term: &Term| {
        term.statistic.is_none() && matches!(term.comparison, None | Some(Comparison::Equal))
    };

    match expression.rest.as_slice() {
        [] if point(&expression.first) => Ok((expression.first.value, false)),
        [(Connective::And, upper)]
            if open_bound(&expression.first, Comparison::Greater)
                && open_bound(upper, Comparison::Less)
                && expression.first.value < upper.value =>
        {
            Ok(((expression.first.value + upper.value) / 2.0, true))
        }
        _ => Err(OdimError::value(
            &entry.node,
            text,
            "expected a literal, center+-tolerance or >X&&<Y",
        )),
    }
}

fn open_bound(term: &Term, sign: Comparison) -> bool {
    term.statistic.is_none() && term.tolerance.is_none() && term.comparison == Some(sign)
}

fn list<T>(entry: &Entry, text: &str, parse: impl Fn(&str) -> Option<T>) -> Result<Vec<T>> {
    if text.is_empty() {
        return Err(OdimError::value(&entry.node, text, "empty list"));
    }
    text.split(',')
        .map(|item| {
            parse(item.trim()).ok_or_else(|| {
                OdimError::value(&entry.node, text, format!("'{}' is not a number", item.trim()))
            })
        })
        .collect()
}
