//! Canned reply selection for the chat simulator.
//!
//! Two interchangeable backends sit behind `ReplyStrategy`:
//! - `KeywordReplies`: ordered keyword groups, first match wins, generic fallback.
//! - `RandomReplies`: uniform choice from a small phrase list.
//!
//! `AppState` carries an `Arc<dyn ReplyStrategy>` picked from `REPLY_STRATEGY`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::models::passenger::PassengerRecord;

pub trait ReplyStrategy: Send + Sync {
    fn reply(&self, message: &str, passenger: &PassengerRecord, rng: &mut dyn RngCore) -> String;

    /// Short label reported in views and logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStrategyKind {
    Keyword,
    Random,
}

impl FromStr for ReplyStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(ReplyStrategyKind::Keyword),
            "random" => Ok(ReplyStrategyKind::Random),
            other => Err(format!("unknown reply strategy '{other}' (expected keyword|random)")),
        }
    }
}

impl fmt::Display for ReplyStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplyStrategyKind::Keyword => f.write_str("keyword"),
            ReplyStrategyKind::Random => f.write_str("random"),
        }
    }
}

pub fn build_reply_strategy(kind: ReplyStrategyKind) -> Arc<dyn ReplyStrategy> {
    match kind {
        ReplyStrategyKind::Keyword => Arc::new(KeywordReplies),
        ReplyStrategyKind::Random => Arc::new(RandomReplies),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Keyword rules
// ────────────────────────────────────────────────────────────────────────────

const GREETING_WORDS: &[&str] = &["hi", "hello", "hey"];
const FALLBACK_REPLY: &str = "That’s interesting! Tell me more.";

/// Topic groups checked in order after greetings. Matched as substrings.
const TOPIC_RULES: &[(&[&str], Topic)] = &[
    (&["trip", "flight"], Topic::Trip),
    (&["food"], Topic::Food),
    (&["music", "song"], Topic::Music),
    (&["study", "abroad"], Topic::Study),
    (&["vacation", "family"], Topic::Family),
];

#[derive(Debug, Clone, Copy)]
enum Topic {
    Trip,
    Food,
    Music,
    Study,
    Family,
}

pub struct KeywordReplies;

impl KeywordReplies {
    fn is_greeting(lower: &str) -> bool {
        // Whole words only; "this" is not a greeting.
        lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| GREETING_WORDS.contains(&word))
    }

    fn topic(lower: &str) -> Option<Topic> {
        TOPIC_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, topic)| *topic)
    }
}

impl ReplyStrategy for KeywordReplies {
    fn reply(&self, message: &str, passenger: &PassengerRecord, _rng: &mut dyn RngCore) -> String {
        let lower = message.to_lowercase();

        if Self::is_greeting(&lower) {
            return format!("Hey there! Nice to meet you, I’m {}.", passenger.name);
        }

        match Self::topic(&lower) {
            Some(Topic::Trip) => "I'm so ready for this trip! Where are you flying to?".to_string(),
            Some(Topic::Food) => {
                "I love trying local foods when I travel! How about you?".to_string()
            }
            Some(Topic::Music) => format!(
                "Good question! I’ve been into {} lately. What do you listen to?",
                passenger.favourite_genre().unwrap_or("Pop")
            ),
            Some(Topic::Study) => {
                "Studying abroad is such an amazing experience! Are you doing it too?".to_string()
            }
            Some(Topic::Family) => {
                "That sounds relaxing! Traveling with family is always special.".to_string()
            }
            None => FALLBACK_REPLY.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Uniform random phrases
// ────────────────────────────────────────────────────────────────────────────

/// `{name}` is replaced with the passenger's name.
const RANDOM_PHRASES: &[&str] = &[
    "Sounds great!",
    "Haha, same here.",
    "Where are you headed after we land?",
    "Nice to meet you, I'm {name}!",
    "Totally agree.",
    "Have you been there before?",
];

pub struct RandomReplies;

impl ReplyStrategy for RandomReplies {
    fn reply(&self, _message: &str, passenger: &PassengerRecord, rng: &mut dyn RngCore) -> String {
        RANDOM_PHRASES
            .choose(rng)
            .copied()
            .unwrap_or(FALLBACK_REPLY)
            .replace("{name}", &passenger.name)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::passenger::InterestDetails;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn passenger() -> PassengerRecord {
        PassengerRecord {
            id: 7,
            name: "Noah".to_string(),
            age: Some(24),
            music: vec!["Jazz".to_string()],
            purpose: vec!["Studying Abroad".to_string()],
            interests: vec![],
            details: InterestDetails::default(),
        }
    }

    fn keyword_reply(message: &str) -> String {
        let mut rng = StdRng::seed_from_u64(1);
        KeywordReplies.reply(message, &passenger(), &mut rng)
    }

    #[test]
    fn test_greeting_is_personalized() {
        assert!(keyword_reply("Hello!").contains("Noah"));
        assert!(keyword_reply("hey, what's up").contains("Noah"));
    }

    #[test]
    fn test_greeting_needs_whole_word() {
        // "this" contains "hi" but is not a greeting
        assert_eq!(keyword_reply("this is nice"), FALLBACK_REPLY);
    }

    #[test]
    fn test_greeting_wins_over_topics() {
        let reply = keyword_reply("hi, how was your flight?");
        assert!(reply.starts_with("Hey there!"));
    }

    #[test]
    fn test_topic_groups_in_order() {
        assert!(keyword_reply("Long FLIGHT ahead").contains("trip"));
        assert!(keyword_reply("any good food?").contains("local foods"));
        assert!(keyword_reply("favourite song?").contains("Jazz"));
        assert!(keyword_reply("I will study in Madrid").contains("Studying abroad"));
        assert!(keyword_reply("seeing my family").contains("family"));
        // trip outranks food when both appear
        assert!(keyword_reply("food on this trip").contains("trip"));
    }

    #[test]
    fn test_unmatched_message_gets_fallback() {
        assert_eq!(keyword_reply("The weather looks cloudy"), FALLBACK_REPLY);
    }

    #[test]
    fn test_random_reply_comes_from_phrase_list() {
        let mut rng = StdRng::seed_from_u64(99);
        let passenger = passenger();
        for _ in 0..20 {
            let reply = RandomReplies.reply("anything", &passenger, &mut rng);
            let known = RANDOM_PHRASES
                .iter()
                .any(|p| p.replace("{name}", "Noah") == reply);
            assert!(known, "unexpected reply {reply}");
        }
    }

    #[test]
    fn test_strategy_kind_parses() {
        assert_eq!("Keyword".parse::<ReplyStrategyKind>(), Ok(ReplyStrategyKind::Keyword));
        assert_eq!("random".parse::<ReplyStrategyKind>(), Ok(ReplyStrategyKind::Random));
        assert!("llm".parse::<ReplyStrategyKind>().is_err());
        assert_eq!(build_reply_strategy(ReplyStrategyKind::Random).name(), "random");
    }
}
