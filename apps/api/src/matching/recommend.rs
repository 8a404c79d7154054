//! Recommendation scorer: additive profile-vs-passenger scoring.
//!
//! Score per passenger:
//! - +1 if the profile's genre is in the passenger's music tags
//! - +1 if the profile's purpose is in the passenger's purpose tags
//! - +1 per profile detail value found among the passenger's detail values
//!   (compared across categories, not per category)
//!
//! `AppState` holds an `Arc<dyn Recommender>`, picked at startup via `AI_MODE`:
//! - `ScoredRecommender`: threshold + stable descending sort + optional cap.
//! - `RotatingRecommender`: a discovery feed of unseen passengers.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::models::passenger::PassengerRecord;
use crate::models::profile::Profile;

/// Batch size of the rotating feed.
pub const ROTATION_BATCH: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub passenger: PassengerRecord,
    pub score: u32,
}

/// Everything a recommender may look at for one visitor.
pub struct RecommendationRequest<'a> {
    pub profile: &'a Profile,
    /// Names shown by the previous `/ai` call.
    pub last_seen: &'a [String],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub min_score: u32,
    pub max_results: Option<usize>,
}

impl ScoringPolicy {
    /// A zero threshold would admit every unscored passenger, so at least 1.
    pub fn effective_threshold(&self) -> u32 {
        self.min_score.max(1)
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            min_score: 3,
            max_results: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiMode {
    Scored,
    Rotating,
}

impl FromStr for AiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scored" => Ok(AiMode::Scored),
            "rotating" => Ok(AiMode::Rotating),
            other => Err(format!("unknown AI mode '{other}' (expected scored|rotating)")),
        }
    }
}

impl fmt::Display for AiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiMode::Scored => f.write_str("scored"),
            AiMode::Rotating => f.write_str("rotating"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Swap backends without touching the `/ai` handler.
pub trait Recommender: Send + Sync {
    fn recommend(
        &self,
        request: &RecommendationRequest<'_>,
        catalog: &Catalog,
        rng: &mut dyn RngCore,
    ) -> Vec<Recommendation>;

    /// "scored" or "rotating", reported in the `/ai` view.
    fn backend(&self) -> &'static str;
}

pub fn build_recommender(mode: AiMode, policy: ScoringPolicy) -> Arc<dyn Recommender> {
    match mode {
        AiMode::Scored => Arc::new(ScoredRecommender { policy }),
        AiMode::Rotating => Arc::new(RotatingRecommender {
            batch_size: ROTATION_BATCH,
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core scoring
// ────────────────────────────────────────────────────────────────────────────

pub fn score_passenger(profile: &Profile, passenger: &PassengerRecord) -> u32 {
    let mut score = 0;

    if let Some(genre) = &profile.music {
        if passenger.likes_genre(genre) {
            score += 1;
        }
    }

    if let Some(purpose) = &profile.purpose {
        if passenger.travels_for(purpose) {
            score += 1;
        }
    }

    score += profile
        .interests
        .values()
        .filter(|value| passenger.details.contains_value(value))
        .count() as u32;

    score
}

/// Thresholded, ranked recommendations. Ties keep catalog order.
pub fn rank(profile: &Profile, catalog: &Catalog, policy: ScoringPolicy) -> Vec<Recommendation> {
    if !profile.has_scoring_attributes() {
        return Vec::new();
    }

    let threshold = policy.effective_threshold();
    let mut ranked: Vec<Recommendation> = catalog
        .iter()
        .filter_map(|passenger| {
            let score = score_passenger(profile, passenger);
            (score >= threshold).then(|| Recommendation {
                passenger: passenger.clone(),
                score,
            })
        })
        .collect();

    // sort_by_key is stable
    ranked.sort_by_key(|r| Reverse(r.score));

    if let Some(max) = policy.max_results {
        ranked.truncate(max);
    }
    ranked
}

// ────────────────────────────────────────────────────────────────────────────
// Backends
// ────────────────────────────────────────────────────────────────────────────

pub struct ScoredRecommender {
    pub policy: ScoringPolicy,
}

impl Recommender for ScoredRecommender {
    fn recommend(
        &self,
        request: &RecommendationRequest<'_>,
        catalog: &Catalog,
        _rng: &mut dyn RngCore,
    ) -> Vec<Recommendation> {
        rank(request.profile, catalog, self.policy)
    }

    fn backend(&self) -> &'static str {
        "scored"
    }
}

/// Random passengers not shown last time. When fewer than a batch remain
/// unseen, the whole catalog is eligible again.
pub struct RotatingRecommender {
    pub batch_size: usize,
}

impl Recommender for RotatingRecommender {
    fn recommend(
        &self,
        request: &RecommendationRequest<'_>,
        catalog: &Catalog,
        rng: &mut dyn RngCore,
    ) -> Vec<Recommendation> {
        let mut available: Vec<&PassengerRecord> = catalog
            .iter()
            .filter(|p| !request.last_seen.contains(&p.name))
            .collect();

        if available.len() < self.batch_size {
            available = catalog.iter().collect();
        }

        available.shuffle(rng);
        available
            .into_iter()
            .take(self.batch_size)
            .map(|passenger| Recommendation {
                score: score_passenger(request.profile, passenger),
                passenger: passenger.clone(),
            })
            .collect()
    }

    fn backend(&self) -> &'static str {
        "rotating"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::passenger::{InterestCategory, InterestDetails};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_passenger(
        id: u32,
        name: &str,
        music: &[&str],
        purpose: &[&str],
        details: &[(InterestCategory, &str)],
    ) -> PassengerRecord {
        let mut interest_details = InterestDetails::default();
        for (category, value) in details {
            interest_details.set(*category, Some(value.to_string()));
        }
        PassengerRecord {
            id,
            name: name.to_string(),
            age: None,
            music: music.iter().map(|s| s.to_string()).collect(),
            purpose: purpose.iter().map(|s| s.to_string()).collect(),
            interests: details.iter().map(|(c, _)| *c).collect(),
            details: interest_details,
        }
    }

    fn make_profile(
        music: Option<&str>,
        purpose: Option<&str>,
        details: &[(InterestCategory, &str)],
    ) -> Profile {
        let mut profile = Profile {
            music: music.map(str::to_string),
            purpose: purpose.map(str::to_string),
            ..Default::default()
        };
        for (category, value) in details {
            profile.interests.set(*category, Some(value.to_string()));
        }
        profile
    }

    fn make_catalog() -> Catalog {
        Catalog::from_records(vec![
            make_passenger(7, "Noah", &["Jazz"], &["Studying Abroad"], &[]),
            make_passenger(
                8,
                "Mia",
                &["Jazz", "Pop"],
                &["Studying Abroad"],
                &[(InterestCategory::Sports, "Tennis")],
            ),
            make_passenger(
                9,
                "Leo",
                &["Jazz"],
                &["Studying Abroad"],
                &[
                    (InterestCategory::Sports, "Tennis"),
                    (InterestCategory::Food, "Coffee"),
                ],
            ),
            make_passenger(10, "Ivy", &["Rock"], &["Business"], &[]),
            make_passenger(
                11,
                "Sam",
                &["Pop"],
                &["Vacation"],
                // Tennis filed under a different category still counts
                &[(InterestCategory::Tech, "Tennis"), (InterestCategory::Food, "Coffee")],
            ),
        ])
    }

    #[test]
    fn test_noah_scores_two_and_misses_threshold_three() {
        let catalog = make_catalog();
        let profile = make_profile(Some("Jazz"), Some("Studying Abroad"), &[]);
        let noah = catalog.get(7).unwrap();

        assert_eq!(score_passenger(&profile, noah), 2);

        let strict = rank(&profile, &catalog, ScoringPolicy::default());
        assert!(strict.iter().all(|r| r.passenger.id != 7));

        let lenient = rank(
            &profile,
            &catalog,
            ScoringPolicy {
                min_score: 0,
                max_results: None,
            },
        );
        assert!(lenient.iter().any(|r| r.passenger.id == 7 && r.score == 2));
    }

    #[test]
    fn test_interest_overlap_is_cross_category() {
        let catalog = make_catalog();
        let profile = make_profile(
            None,
            None,
            &[
                (InterestCategory::Sports, "Tennis"),
                (InterestCategory::Food, "Coffee"),
            ],
        );
        assert_eq!(score_passenger(&profile, catalog.get(11).unwrap()), 2);
        assert_eq!(score_passenger(&profile, catalog.get(9).unwrap()), 2);
        assert_eq!(score_passenger(&profile, catalog.get(10).unwrap()), 0);
    }

    #[test]
    fn test_empty_profile_yields_nothing_even_at_zero_threshold() {
        let catalog = make_catalog();
        let policy = ScoringPolicy {
            min_score: 0,
            max_results: None,
        };
        assert!(rank(&Profile::default(), &catalog, policy).is_empty());
    }

    #[test]
    fn test_zero_scores_never_pass_zero_threshold() {
        let catalog = make_catalog();
        let profile = make_profile(Some("Classical"), None, &[]);
        let policy = ScoringPolicy {
            min_score: 0,
            max_results: None,
        };
        assert!(rank(&profile, &catalog, policy).is_empty());
    }

    #[test]
    fn test_results_meet_threshold_and_are_sorted_stably() {
        let catalog = make_catalog();
        let profile = make_profile(
            Some("Jazz"),
            Some("Studying Abroad"),
            &[(InterestCategory::Sports, "Tennis")],
        );
        let policy = ScoringPolicy {
            min_score: 1,
            max_results: None,
        };
        let ranked = rank(&profile, &catalog, policy);

        assert!(ranked.iter().all(|r| r.score >= 1));
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));

        // 8 and 9 both score 3; catalog order breaks the tie
        let order: Vec<u32> = ranked.iter().map(|r| r.passenger.id).collect();
        assert_eq!(order, vec![8, 9, 7, 11]);
    }

    #[test]
    fn test_max_results_truncates() {
        let catalog = make_catalog();
        let profile = make_profile(Some("Jazz"), None, &[]);
        let policy = ScoringPolicy {
            min_score: 1,
            max_results: Some(2),
        };
        let ranked = rank(&profile, &catalog, policy);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn test_scored_backend_matches_rank() {
        let catalog = make_catalog();
        let profile = make_profile(Some("Jazz"), Some("Studying Abroad"), &[]);
        let recommender = build_recommender(AiMode::Scored, ScoringPolicy::default());
        let mut rng = StdRng::seed_from_u64(0);
        let request = RecommendationRequest {
            profile: &profile,
            last_seen: &[],
        };
        let recs = recommender.recommend(&request, &catalog, &mut rng);
        assert_eq!(recommender.backend(), "scored");
        assert!(recs.iter().all(|r| r.score >= 3));
    }

    #[test]
    fn test_rotating_backend_skips_last_seen() {
        let mut records = Vec::new();
        for id in 1..=14 {
            records.push(make_passenger(id, &format!("P{id}"), &["Pop"], &["Vacation"], &[]));
        }
        let catalog = Catalog::from_records(records);
        let profile = Profile::default();
        let recommender = RotatingRecommender { batch_size: 6 };
        let mut rng = StdRng::seed_from_u64(5);

        let first = recommender.recommend(
            &RecommendationRequest {
                profile: &profile,
                last_seen: &[],
            },
            &catalog,
            &mut rng,
        );
        assert_eq!(first.len(), 6);

        let seen: Vec<String> = first.iter().map(|r| r.passenger.name.clone()).collect();
        let second = recommender.recommend(
            &RecommendationRequest {
                profile: &profile,
                last_seen: &seen,
            },
            &catalog,
            &mut rng,
        );
        assert_eq!(second.len(), 6);
        assert!(second.iter().all(|r| !seen.contains(&r.passenger.name)));
    }

    #[test]
    fn test_rotating_backend_resets_when_pool_runs_dry() {
        let records = (1..=7)
            .map(|id| make_passenger(id, &format!("P{id}"), &["Pop"], &["Vacation"], &[]))
            .collect();
        let catalog = Catalog::from_records(records);
        let profile = Profile::default();
        let seen: Vec<String> = (1..=6).map(|id| format!("P{id}")).collect();
        let mut rng = StdRng::seed_from_u64(5);

        let recs = RotatingRecommender { batch_size: 6 }.recommend(
            &RecommendationRequest {
                profile: &profile,
                last_seen: &seen,
            },
            &catalog,
            &mut rng,
        );
        assert_eq!(recs.len(), 6);
    }

    #[test]
    fn test_ai_mode_parsing() {
        assert_eq!("Rotating".parse::<AiMode>(), Ok(AiMode::Rotating));
        assert!("magic".parse::<AiMode>().is_err());
    }
}
