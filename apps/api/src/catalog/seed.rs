//! Seed file parsing and normalization.
//!
//! Seed records are loose: `music`/`purpose` may be a string or a list, `id` and
//! `purpose` may be missing, and interest categories may lack a detail value.
//! Normalization fills every gap deterministically from the record id, so the
//! same seed file always produces the same catalog.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::warn;

use crate::catalog::CatalogError;
use crate::models::passenger::{
    canonical_genre, canonical_purpose, InterestCategory, InterestDetails, PassengerRecord,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawPassenger {
    id: Option<u32>,
    name: String,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    music: Option<OneOrMany>,
    #[serde(default)]
    purpose: Option<OneOrMany>,
    #[serde(default)]
    interests: Vec<String>,
    #[serde(flatten)]
    details: InterestDetails,
}

pub fn parse_seed(raw: &str) -> Result<Vec<RawPassenger>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Purpose assigned to seed records that do not name one.
pub fn default_purpose(id: u32) -> &'static str {
    if id % 2 == 0 {
        "Vacation"
    } else {
        "Studying Abroad"
    }
}

/// `options[id mod len]` for the category. Stable across loads.
pub fn deterministic_detail(category: InterestCategory, id: u32) -> &'static str {
    let options = category.options();
    options[id as usize % options.len()]
}

pub fn normalize(raw: Vec<RawPassenger>) -> Result<Vec<PassengerRecord>, CatalogError> {
    let last_given = raw.iter().filter_map(|r| r.id).max().unwrap_or(0);
    // `None` once the id space is used up.
    let mut next_id = last_given.checked_add(1);
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(raw.len());

    for passenger in raw {
        let id = match passenger.id {
            Some(id) => id,
            None => {
                let id = next_id.ok_or(CatalogError::IdOverflow(last_given))?;
                next_id = id.checked_add(1);
                id
            }
        };
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId(id));
        }
        records.push(normalize_record(id, passenger)?);
    }

    Ok(records)
}

fn normalize_record(id: u32, raw: RawPassenger) -> Result<PassengerRecord, CatalogError> {
    let mut music = Vec::new();
    for genre in raw.music.map(OneOrMany::into_vec).unwrap_or_default() {
        match canonical_genre(&genre) {
            Some(g) if !music.iter().any(|m: &String| m == g) => music.push(g.to_string()),
            Some(_) => {}
            None => warn!("Passenger {id}: skipping unknown genre '{genre}'"),
        }
    }
    if music.is_empty() {
        return Err(CatalogError::MissingMusic(id));
    }

    let mut purpose = Vec::new();
    for reason in raw.purpose.map(OneOrMany::into_vec).unwrap_or_default() {
        match canonical_purpose(&reason) {
            Some(p) if !purpose.iter().any(|q: &String| q == p) => purpose.push(p.to_string()),
            Some(_) => {}
            None => warn!("Passenger {id}: skipping unknown purpose '{reason}'"),
        }
    }
    if purpose.is_empty() {
        purpose.push(default_purpose(id).to_string());
    }

    let mut interests: Vec<InterestCategory> = Vec::new();
    for name in &raw.interests {
        match name.parse::<InterestCategory>() {
            Ok(category) if !interests.contains(&category) => interests.push(category),
            Ok(_) => {}
            Err(e) => warn!("Passenger {id}: {e}"),
        }
    }

    let mut details = InterestDetails::default();
    for category in InterestCategory::ALL {
        let value = match raw.details.get(category) {
            Some(value) => {
                if !interests.contains(&category) {
                    interests.push(category);
                }
                match category.canonical_option(value) {
                    Some(canonical) => canonical,
                    None => {
                        let replacement = deterministic_detail(category, id);
                        warn!(
                            "Passenger {id}: '{value}' is not a {category} option, using '{replacement}'"
                        );
                        replacement
                    }
                }
            }
            None if interests.contains(&category) => deterministic_detail(category, id),
            None => continue,
        };
        details.set(category, Some(value.to_string()));
    }

    Ok(PassengerRecord {
        id,
        name: raw.name.trim().to_string(),
        age: raw.age,
        music,
        purpose,
        interests,
        details,
    })
}
