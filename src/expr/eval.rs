use super::lexer::{Comparison, Statistic};
use super::parser::{Connective, Expression, Term};
use crate::error::{OdimError, Result};
use crate::store::Statistics;

/// Absolute tolerance used for every numeric equality
pub const EQUALITY_TOLERANCE: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EQUALITY_TOLERANCE
}

fn compare(x: f64, term: &Term) -> bool {
    let v = term.value;
    if let Some(tolerance) = term.tolerance {
        return (x - v).abs() <= tolerance + EQUALITY_TOLERANCE;
    }
    match term.sign() {
        Comparison::Equal => approx_eq(x, v),
        Comparison::LessEqual => x <= v + EQUALITY_TOLERANCE,
        Comparison::GreaterEqual => x >= v - EQUALITY_TOLERANCE,
        Comparison::Less => x < v && !approx_eq(x, v),
        Comparison::Greater => x > v && !approx_eq(x, v),
    }
}

fn reduce(stats: &Statistics, statistic: Statistic) -> f64 {
    match statistic {
        Statistic::First => stats.first,
        Statistic::Last => stats.last,
        Statistic::Min => stats.min,
        Statistic::Max => stats.max,
        Statistic::Mean => stats.mean,
    }
}

impl Expression {
    /// Evaluate against numeric values.
    ///
    /// `is_array` distinguishes a one-element array from a scalar: a term on
    /// an array needs a statistic or a comparison sign.
    pub fn evaluate(&self, values: &[f64], is_array: bool) -> Result<bool> {
        let mut result = self.evaluate_term(&self.first, values, is_array)?;
        for (connective, term) in &self.rest {
            let next = self.evaluate_term(term, values, is_array)?;
            result = match connective {
                Connective::And => result && next,
                Connective::Or => result || next,
            };
        }
        Ok(result)
    }

    fn evaluate_term(&self, term: &Term, values: &[f64], is_array: bool) -> Result<bool> {
        match term.statistic {
            Some(statistic) => Ok(Statistics::of(values)
                .map(|stats| compare(reduce(&stats, statistic), term))
                .unwrap_or(false)),
            None if is_array && term.comparison.is_none() && term.tolerance.is_none() => {
                Err(OdimError::expression(
                    &self.text,
                    "an array value needs a statistic (first, last, min, max, mean) or a comparison sign",
                ))
            }
            None => Ok(!values.is_empty() && values.iter().all(|x| compare(*x, term))),
        }
    }
}
