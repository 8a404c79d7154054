use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::chat::ChatThreads;
use crate::models::profile::Profile;

/// How many passengers `recent` remembers.
pub const RECENT_LIMIT: usize = 10;

/// Typed per-visitor session document.
///
/// Key names match the session layout older builds wrote, so stored documents
/// stay readable. Missing keys fall back to their empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionData {
    pub profile: Profile,
    pub filter_music: Option<String>,
    pub filter_purpose: Option<String>,
    pub filter_interests: Option<String>,
    pub filter_interests_exact: Option<String>,
    /// Passenger ids, most recently connected first.
    pub recent: Vec<u32>,
    pub likes: BTreeSet<u32>,
    #[serde(alias = "chat_history")]
    pub chats: ChatThreads,
    pub last_ai_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeAction {
    Added,
    Removed,
}

/// The active interest selection, if any. Only one of the two slots is ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterestSelection {
    /// Any value from the global option space (detail value or category name).
    Any(String),
    /// Restricted to values held by the visitor's own profile.
    Exact(String),
}

impl SessionData {
    pub fn toggle_like(&mut self, passenger_id: u32) -> LikeAction {
        if self.likes.remove(&passenger_id) {
            LikeAction::Removed
        } else {
            self.likes.insert(passenger_id);
            LikeAction::Added
        }
    }

    pub fn is_liked(&self, passenger_id: u32) -> bool {
        self.likes.contains(&passenger_id)
    }

    pub fn record_recent(&mut self, passenger_id: u32) {
        self.recent.retain(|id| *id != passenger_id);
        self.recent.insert(0, passenger_id);
        self.recent.truncate(RECENT_LIMIT);
    }

    pub fn interest_selection(&self) -> Option<InterestSelection> {
        if let Some(value) = &self.filter_interests_exact {
            return Some(InterestSelection::Exact(value.clone()));
        }
        self.filter_interests.clone().map(InterestSelection::Any)
    }

    pub fn set_interest_selection(&mut self, selection: InterestSelection) {
        match selection {
            InterestSelection::Any(value) => {
                self.filter_interests = Some(value);
                self.filter_interests_exact = None;
            }
            InterestSelection::Exact(value) => {
                self.filter_interests_exact = Some(value);
                self.filter_interests = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toggle_like_twice_restores_empty_set() {
        let mut data = SessionData::default();
        assert_eq!(data.toggle_like(7), LikeAction::Added);
        assert!(data.is_liked(7));
        assert_eq!(data.toggle_like(7), LikeAction::Removed);
        assert!(data.likes.is_empty());
    }

    #[test]
    fn test_recent_is_deduplicated_and_capped() {
        let mut data = SessionData::default();
        for id in 1..=12 {
            data.record_recent(id);
        }
        data.record_recent(5);
        assert_eq!(data.recent.len(), RECENT_LIMIT);
        assert_eq!(data.recent[0], 5);
        assert_eq!(data.recent.iter().filter(|id| **id == 5).count(), 1);
    }

    #[test]
    fn test_interest_slots_are_mutually_exclusive() {
        let mut data = SessionData::default();
        data.set_interest_selection(InterestSelection::Any("Tennis".to_string()));
        data.set_interest_selection(InterestSelection::Exact("Coffee".to_string()));
        assert!(data.filter_interests.is_none());
        assert_eq!(
            data.interest_selection(),
            Some(InterestSelection::Exact("Coffee".to_string()))
        );
    }

    #[test]
    fn test_reads_legacy_chat_history_key_and_missing_fields() {
        let doc = json!({
            "profile": { "first_name": "Ann", "music": "Jazz" },
            "chat_history": { "7": [{ "sender": "You", "text": "hi" }] },
            "likes": [3, 7]
        });
        let data: SessionData = serde_json::from_value(doc).unwrap();
        assert_eq!(data.profile.music.as_deref(), Some("Jazz"));
        assert_eq!(data.chats["7"].len(), 1);
        assert!(data.is_liked(3));
        assert!(data.recent.is_empty());
        assert!(data.filter_music.is_none());
    }
}
