//! View models shared by several handlers. A template layer renders these.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::passenger::{InterestCategory, PassengerRecord, GENRES, PURPOSES};

/// A passenger as listed in browsing views.
#[derive(Debug, Clone, Serialize)]
pub struct PassengerCard {
    #[serde(flatten)]
    pub passenger: PassengerRecord,
    pub liked: bool,
}

pub fn cards(passengers: &[&PassengerRecord], likes: &BTreeSet<u32>) -> Vec<PassengerCard> {
    passengers
        .iter()
        .map(|p| PassengerCard {
            passenger: (*p).clone(),
            liked: likes.contains(&p.id),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct InterestOptions {
    pub category: InterestCategory,
    pub options: &'static [&'static str],
}

/// Every choice the onboarding form and the browsing pages offer.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileOptions {
    pub genres: &'static [&'static str],
    pub purposes: &'static [&'static str],
    pub interests: Vec<InterestOptions>,
}

impl ProfileOptions {
    pub fn all() -> Self {
        Self {
            genres: GENRES,
            purposes: PURPOSES,
            interests: interest_options(),
        }
    }
}

pub fn interest_options() -> Vec<InterestOptions> {
    InterestCategory::ALL
        .iter()
        .map(|category| InterestOptions {
            category: *category,
            options: category.options(),
        })
        .collect()
}
