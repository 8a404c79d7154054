use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Music genres a passenger or visitor can pick from.
pub const GENRES: &[&str] = &[
    "Hip-Hop",
    "Jazz",
    "Classical",
    "Pop",
    "Rock",
    "Country",
    "R&B",
    "Electronic",
];

/// Trip purposes a passenger or visitor can pick from.
pub const PURPOSES: &[&str] = &[
    "Vacation",
    "Business",
    "Visiting Family",
    "Studying Abroad",
    "Event / Conference",
];

/// Older seed files spell some purposes differently.
const PURPOSE_ALIASES: &[(&str, &str)] = &[
    ("Study Abroad", "Studying Abroad"),
    ("Event", "Event / Conference"),
    ("Conference", "Event / Conference"),
];

/// Returns the canonical spelling of a genre, matching case-insensitively.
pub fn canonical_genre(value: &str) -> Option<&'static str> {
    let value = value.trim();
    GENRES
        .iter()
        .copied()
        .find(|g| g.eq_ignore_ascii_case(value))
}

/// Returns the canonical spelling of a purpose, resolving legacy aliases.
pub fn canonical_purpose(value: &str) -> Option<&'static str> {
    let value = value.trim();
    PURPOSES
        .iter()
        .copied()
        .find(|p| p.eq_ignore_ascii_case(value))
        .or_else(|| {
            PURPOSE_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(value))
                .map(|(_, canonical)| *canonical)
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterestCategory {
    Sports,
    Tech,
    Art,
    Food,
    Shopping,
}

impl InterestCategory {
    pub const ALL: [InterestCategory; 5] = [
        InterestCategory::Sports,
        InterestCategory::Tech,
        InterestCategory::Art,
        InterestCategory::Food,
        InterestCategory::Shopping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestCategory::Sports => "Sports",
            InterestCategory::Tech => "Tech",
            InterestCategory::Art => "Art",
            InterestCategory::Food => "Food",
            InterestCategory::Shopping => "Shopping",
        }
    }

    /// The detail values allowed for this category.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            InterestCategory::Sports => &[
                "Tennis",
                "Soccer",
                "Basketball",
                "Running",
                "Swimming",
                "Hiking",
            ],
            InterestCategory::Tech => &["AI", "Gaming", "Startups", "Gadgets", "Coding"],
            InterestCategory::Art => &["Painting", "Photography", "Museums", "Film", "Design"],
            InterestCategory::Food => &["Street Food", "Fine Dining", "Coffee", "Baking", "Vegan"],
            InterestCategory::Shopping => &["Fashion", "Vintage", "Markets", "Sneakers", "Books"],
        }
    }

    /// Canonical spelling of `value` if it is one of this category's options.
    pub fn canonical_option(&self, value: &str) -> Option<&'static str> {
        let value = value.trim();
        self.options()
            .iter()
            .copied()
            .find(|o| o.eq_ignore_ascii_case(value))
    }

    /// Finds the category owning a detail value, if any.
    pub fn owning(value: &str) -> Option<(InterestCategory, &'static str)> {
        Self::ALL
            .iter()
            .find_map(|c| c.canonical_option(value).map(|v| (*c, v)))
    }
}

impl fmt::Display for InterestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterestCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown interest category '{s}'"))
    }
}

/// One optional detail value per interest category.
///
/// Serialized flat (`sports`, `tech`, ...) so it lines up with the seed file
/// and the session document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sports: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopping: Option<String>,
}

impl InterestDetails {
    pub fn get(&self, category: InterestCategory) -> Option<&str> {
        self.slot(category).as_deref()
    }

    pub fn set(&mut self, category: InterestCategory, value: Option<String>) {
        *self.slot_mut(category) = value;
    }

    /// Present (category, value) pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (InterestCategory, &str)> + '_ {
        InterestCategory::ALL
            .iter()
            .filter_map(move |c| self.get(*c).map(|v| (*c, v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn contains_value(&self, value: &str) -> bool {
        self.values().any(|v| v.eq_ignore_ascii_case(value))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn slot(&self, category: InterestCategory) -> &Option<String> {
        match category {
            InterestCategory::Sports => &self.sports,
            InterestCategory::Tech => &self.tech,
            InterestCategory::Art => &self.art,
            InterestCategory::Food => &self.food,
            InterestCategory::Shopping => &self.shopping,
        }
    }

    fn slot_mut(&mut self, category: InterestCategory) -> &mut Option<String> {
        match category {
            InterestCategory::Sports => &mut self.sports,
            InterestCategory::Tech => &mut self.tech,
            InterestCategory::Art => &mut self.art,
            InterestCategory::Food => &mut self.food,
            InterestCategory::Shopping => &mut self.shopping,
        }
    }
}

/// A normalized catalog entry. Built by the catalog loader, never mutated after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub music: Vec<String>,
    pub purpose: Vec<String>,
    pub interests: Vec<InterestCategory>,
    #[serde(flatten)]
    pub details: InterestDetails,
}

impl PassengerRecord {
    pub fn likes_genre(&self, genre: &str) -> bool {
        self.music.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }

    pub fn travels_for(&self, purpose: &str) -> bool {
        self.purpose.iter().any(|p| p.eq_ignore_ascii_case(purpose))
    }

    pub fn has_category(&self, category: InterestCategory) -> bool {
        self.interests.contains(&category)
    }

    /// The first listed genre, used to personalize chat replies.
    pub fn favourite_genre(&self) -> Option<&str> {
        self.music.first().map(String::as_str)
    }
}
