//! Filter engine: maps (catalog, selected value) to matching passengers.
//!
//! Matching is a linear scan. How many results a listing shows is decided
//! separately by a `ResultPolicy`, configured per browsing dimension:
//! - `Unbounded`: exactly the matches.
//! - `Padded { min, max }`: pad short lists with random non-matching
//!   passengers, downsample long ones to `max`.

use std::fmt;
use std::str::FromStr;

use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::catalog::Catalog;
use crate::models::passenger::{InterestCategory, PassengerRecord};
use crate::models::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultPolicy {
    Unbounded,
    /// Below `min`, pad to `min` (or to a random size in `min..=max` when `max`
    /// is set). Above `max`, downsample to `max`.
    Padded { min: usize, max: Option<usize> },
}

impl FromStr for ResultPolicy {
    type Err = String;

    /// Accepts `unbounded`, `padded:MIN` or `padded:MIN-MAX`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "unbounded" {
            return Ok(ResultPolicy::Unbounded);
        }

        let range = s
            .strip_prefix("padded:")
            .ok_or_else(|| format!("unknown result policy '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid padded bound '{v}': {e}"))
        };

        let (min, max) = match range.split_once('-') {
            Some((min, max)) => (parse(min)?, Some(parse(max)?)),
            None => (parse(range)?, None),
        };
        if let Some(max) = max {
            if max < min {
                return Err(format!("padded range {min}-{max} is empty"));
            }
        }
        Ok(ResultPolicy::Padded { min, max })
    }
}

impl fmt::Display for ResultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultPolicy::Unbounded => f.write_str("unbounded"),
            ResultPolicy::Padded { min, max: None } => write!(f, "padded:{min}"),
            ResultPolicy::Padded {
                min,
                max: Some(max),
            } => write!(f, "padded:{min}-{max}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Matching
// ────────────────────────────────────────────────────────────────────────────

pub fn filter_music<'a>(catalog: &'a Catalog, genre: &str) -> Vec<&'a PassengerRecord> {
    catalog.iter().filter(|p| p.likes_genre(genre)).collect()
}

pub fn filter_purpose<'a>(catalog: &'a Catalog, purpose: &str) -> Vec<&'a PassengerRecord> {
    catalog.iter().filter(|p| p.travels_for(purpose)).collect()
}

/// Global option space: `value` is either a detail value ("Tennis") or a
/// category name ("Sports").
pub fn filter_interest<'a>(catalog: &'a Catalog, value: &str) -> Vec<&'a PassengerRecord> {
    match value.parse::<InterestCategory>() {
        Ok(category) => catalog.iter().filter(|p| p.has_category(category)).collect(),
        Err(_) => catalog
            .iter()
            .filter(|p| p.details.contains_value(value))
            .collect(),
    }
}

/// Only values the visitor's own profile holds are searchable.
pub fn filter_interest_exact<'a>(
    catalog: &'a Catalog,
    profile: &Profile,
    value: &str,
) -> Vec<&'a PassengerRecord> {
    if !profile.interests.contains_value(value) {
        return Vec::new();
    }
    catalog
        .iter()
        .filter(|p| p.details.contains_value(value))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Result sizing
// ────────────────────────────────────────────────────────────────────────────

pub fn apply_policy<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    mut matches: Vec<&'a PassengerRecord>,
    policy: ResultPolicy,
    rng: &mut R,
) -> Vec<&'a PassengerRecord> {
    let (min, max) = match policy {
        ResultPolicy::Unbounded => return matches,
        ResultPolicy::Padded { min, max } => (min, max),
    };

    if matches.len() < min {
        let target = match max {
            Some(max) if max > min => rng.gen_range(min..=max),
            _ => min,
        };
        let needed = target - matches.len();

        // Exclude by full-record equality, not just by name.
        let mut filler: Vec<&PassengerRecord> = catalog
            .iter()
            .filter(|p| !matches.iter().any(|m| *m == *p))
            .collect();
        filler.shuffle(rng);
        filler.truncate(needed);
        matches.extend(filler);
        return matches;
    }

    match max {
        Some(max) if matches.len() > max => {
            let mut keep = index::sample(rng, matches.len(), max).into_vec();
            keep.sort_unstable();
            keep.into_iter().map(|i| matches[i]).collect()
        }
        _ => matches,
    }
}
