use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::passenger::{canonical_genre, canonical_purpose, InterestCategory, InterestDetails};

/// The visitor's self-reported travel profile. Only input to the recommender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub music: Option<String>,
    pub purpose: Option<String>,
    #[serde(flatten)]
    pub interests: InterestDetails,
}

impl Profile {
    /// True when at least one attribute the recommender scores on is set.
    pub fn has_scoring_attributes(&self) -> bool {
        self.music.is_some() || self.purpose.is_some() || !self.interests.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty() && self.last_name.is_empty() && !self.has_scoring_attributes()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Raw onboarding form. Every field is optional; sanitizing happens in `From`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileSubmission {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Single "full name" field used by the older onboarding form.
    pub name: Option<String>,
    #[serde(alias = "music")]
    pub genre: Option<String>,
    pub purpose: Option<String>,
    pub sports: Option<String>,
    pub tech: Option<String>,
    pub art: Option<String>,
    pub food: Option<String>,
    pub shopping: Option<String>,
}

impl ProfileSubmission {
    fn detail(&self, category: InterestCategory) -> Option<&str> {
        match category {
            InterestCategory::Sports => self.sports.as_deref(),
            InterestCategory::Tech => self.tech.as_deref(),
            InterestCategory::Art => self.art.as_deref(),
            InterestCategory::Food => self.food.as_deref(),
            InterestCategory::Shopping => self.shopping.as_deref(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl From<ProfileSubmission> for Profile {
    /// Builds a fresh profile. Values outside the known option lists are dropped.
    fn from(submission: ProfileSubmission) -> Self {
        let mut first_name = non_blank(submission.first_name.as_deref())
            .unwrap_or_default()
            .to_string();
        let mut last_name = non_blank(submission.last_name.as_deref())
            .unwrap_or_default()
            .to_string();

        if first_name.is_empty() && last_name.is_empty() {
            if let Some(full) = non_blank(submission.name.as_deref()) {
                let (first, last) = full.split_once(char::is_whitespace).unwrap_or((full, ""));
                first_name = first.to_string();
                last_name = last.trim().to_string();
            }
        }

        let music = non_blank(submission.genre.as_deref()).and_then(|g| {
            let canonical = canonical_genre(g);
            if canonical.is_none() {
                debug!("Dropping unknown genre '{g}' from profile");
            }
            canonical.map(str::to_string)
        });

        let purpose = non_blank(submission.purpose.as_deref()).and_then(|p| {
            let canonical = canonical_purpose(p);
            if canonical.is_none() {
                debug!("Dropping unknown purpose '{p}' from profile");
            }
            canonical.map(str::to_string)
        });

        let mut interests = InterestDetails::default();
        for category in InterestCategory::ALL {
            let value = non_blank(submission.detail(category))
                .and_then(|v| category.canonical_option(v))
                .map(str::to_string);
            interests.set(category, value);
        }

        Profile {
            first_name,
            last_name,
            music,
            purpose,
            interests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_has_no_scoring_attributes() {
        let profile = Profile::default();
        assert!(profile.is_empty());
        assert!(!profile.has_scoring_attributes());
    }

    #[test]
    fn test_submission_canonicalizes_values() {
        let profile = Profile::from(ProfileSubmission {
            first_name: Some(" Ann ".to_string()),
            genre: Some("jazz".to_string()),
            purpose: Some("Study Abroad".to_string()),
            sports: Some("tennis".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.first_name, "Ann");
        assert_eq!(profile.music.as_deref(), Some("Jazz"));
        assert_eq!(profile.purpose.as_deref(), Some("Studying Abroad"));
        assert_eq!(profile.interests.get(InterestCategory::Sports), Some("Tennis"));
    }

    #[test]
    fn test_submission_drops_values_outside_option_lists() {
        let profile = Profile::from(ProfileSubmission {
            genre: Some("Polka".to_string()),
            purpose: Some("   ".to_string()),
            // Valid detail, wrong category
            tech: Some("Tennis".to_string()),
            ..Default::default()
        });
        assert!(!profile.has_scoring_attributes());
    }

    #[test]
    fn test_full_name_field_is_split() {
        let profile = Profile::from(ProfileSubmission {
            name: Some("Maria de la Cruz".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.first_name, "Maria");
        assert_eq!(profile.last_name, "de la Cruz");
        assert_eq!(profile.display_name(), "Maria de la Cruz");
    }
}
