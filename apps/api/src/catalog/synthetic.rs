use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::seed::deterministic_detail;
use crate::catalog::CatalogError;
use crate::models::passenger::{InterestCategory, InterestDetails, PassengerRecord, GENRES, PURPOSES};

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Taylor", "Morgan", "Riley", "Casey", "Jamie", "Avery", "Quinn", "Skyler",
    "Harper", "Rowan", "Emerson", "Sage", "Parker", "Reese", "Dakota", "Finley", "Hayden", "Kai",
    "Logan", "Mila", "Nora", "Omar", "Priya", "Mateo", "Yuki", "Lena", "Ines", "Tariq",
];

const AGE_RANGE: std::ops::RangeInclusive<u32> = 18..=60;

/// Generates `count` passengers with ids starting at `first_id`.
/// The same `seed` always yields the same passengers.
pub fn generate(count: usize, seed: u64, first_id: u32) -> Result<Vec<PassengerRecord>, CatalogError> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|offset| -> Result<PassengerRecord, CatalogError> {
            let id = u32::try_from(offset)
                .ok()
                .and_then(|offset| first_id.checked_add(offset))
                .ok_or(CatalogError::IdOverflow(first_id))?;
            Ok(synthesize(&mut rng, id))
        })
        .collect()
}

fn synthesize(rng: &mut StdRng, id: u32) -> PassengerRecord {
    let name = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex").to_string();
    let age = rng.gen_range(AGE_RANGE);

    let genre_count = rng.gen_range(1..=2);
    let music = GENRES
        .choose_multiple(rng, genre_count)
        .map(|g| g.to_string())
        .collect();

    let category_count = rng.gen_range(2..=3);
    let interests: Vec<InterestCategory> = InterestCategory::ALL
        .choose_multiple(rng, category_count)
        .copied()
        .collect();

    let mut details = InterestDetails::default();
    for category in &interests {
        let value = category
            .options()
            .choose(rng)
            .copied()
            .unwrap_or_else(|| deterministic_detail(*category, id));
        details.set(*category, Some(value.to_string()));
    }

    let purpose = PURPOSES.choose(rng).copied().unwrap_or("Vacation").to_string();

    PassengerRecord {
        id,
        name,
        age: Some(age),
        music,
        purpose: vec![purpose],
        interests,
        details,
    }
}
