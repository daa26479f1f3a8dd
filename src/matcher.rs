//! Column selection from free text.
//!
//! Columns are scanned in declared order and matched when their lowercased
//! name is a substring of the lowercased text, so the first declared column
//! wins when names overlap. Two-column requests fall back to a random pair
//! drawn from the injected RNG when the text does not name two columns.

use rand::{Rng, seq::SliceRandom};
use serde::Serialize;

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    Two,
}

impl Arity {
    pub fn from_count(count: usize) -> Self {
        if count >= 2 { Arity::Two } else { Arity::One }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSource {
    Text,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumns {
    pub columns: Vec<String>,
    pub source: ColumnSource,
}

impl ResolvedColumns {
    pub fn first(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    pub fn pair(&self) -> Option<(&str, &str)> {
        match self.columns.as_slice() {
            [x, y, ..] => Some((x.as_str(), y.as_str())),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Columns whose name appears in `text`, in declared order.
pub fn mentioned_columns<'c>(text: &str, columns: &'c [String]) -> impl Iterator<Item = &'c String> {
    let lowered = text.to_lowercase();
    columns
        .iter()
        .filter(|column| !column.trim().is_empty())
        .filter(move |column| lowered.contains(&column.to_lowercase()))
}

/// First declared column named in `text`.
pub fn match_single(text: &str, columns: &[String]) -> Option<String> {
    mentioned_columns(text, columns).next().cloned()
}

/// x/y pair from the text, or a random distinct pair when fewer than two
/// columns are named.
pub fn match_pair<R: Rng + ?Sized>(
    text: &str,
    columns: &[String],
    rng: &mut R,
) -> Result<ResolvedColumns, QueryError> {
    let named: Vec<String> = mentioned_columns(text, columns).take(2).cloned().collect();
    if named.len() == 2 {
        return Ok(ResolvedColumns {
            columns: named,
            source: ColumnSource::Text,
        });
    }
    random_pair(columns, rng).map(|(x, y)| ResolvedColumns {
        columns: vec![x, y],
        source: ColumnSource::Random,
    })
}

/// Uniform x, then uniform y from the remaining columns.
pub fn random_pair<R: Rng + ?Sized>(
    columns: &[String],
    rng: &mut R,
) -> Result<(String, String), QueryError> {
    let insufficient = || QueryError::InsufficientColumns {
        chart: "two-column chart".to_string(),
        available: columns.len(),
    };
    let x = columns.choose(rng).ok_or_else(insufficient)?;
    let remaining: Vec<&String> = columns.iter().filter(|column| *column != x).collect();
    let y = remaining.choose(rng).ok_or_else(insufficient)?;
    Ok((x.clone(), (*y).clone()))
}

pub fn match_columns<R: Rng + ?Sized>(
    text: &str,
    columns: &[String],
    arity: Arity,
    rng: &mut R,
) -> Result<ResolvedColumns, QueryError> {
    match arity {
        Arity::One => Ok(ResolvedColumns {
            columns: match_single(text, columns).into_iter().collect(),
            source: ColumnSource::Text,
        }),
        Arity::Two => match_pair(text, columns, rng),
    }
}
