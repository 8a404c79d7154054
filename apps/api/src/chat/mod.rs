//! Chat simulator: one message log per (session, passenger).
//!
//! A thread is either Empty or Active. Opening with `fresh` forces Empty, and a
//! thread carrying legacy seeded demo lines is scrubbed back to Empty on open.
//! Every non-blank send appends the visitor line plus exactly one reply.

pub mod replies;

use std::collections::BTreeMap;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::replies::ReplyStrategy;
use crate::models::passenger::PassengerRecord;

/// Sender label used for the visitor's own messages.
pub const VISITOR_SENDER: &str = "You";

/// Demo lines older builds seeded into every thread.
const LEGACY_PLACEHOLDERS: &[&str] = &[
    "Hey there! Excited for our trip?",
    "Same here! Can't wait to explore.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
}

impl ChatMessage {
    fn is_legacy_placeholder(&self) -> bool {
        LEGACY_PLACEHOLDERS.iter().any(|p| self.text.contains(p))
    }
}

/// Threads keyed by passenger id (as a string, so the session document stays plain JSON).
pub type ChatThreads = BTreeMap<String, Vec<ChatMessage>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    Empty,
    Active,
}

impl ThreadState {
    pub fn of(messages: &[ChatMessage]) -> Self {
        if messages.is_empty() {
            ThreadState::Empty
        } else {
            ThreadState::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Ignored,
}

fn thread_key(passenger_id: u32) -> String {
    passenger_id.to_string()
}

/// Opens (or creates) the thread for a passenger and returns its messages.
pub fn open_thread(threads: &mut ChatThreads, passenger_id: u32, fresh: bool) -> Vec<ChatMessage> {
    let thread = threads.entry(thread_key(passenger_id)).or_default();

    if fresh {
        thread.clear();
    } else if thread.iter().any(ChatMessage::is_legacy_placeholder) {
        debug!("Scrubbing legacy placeholder lines from thread with passenger {passenger_id}");
        thread.clear();
    }

    thread.clone()
}

/// Appends the visitor message and one reply. Blank messages change nothing.
pub fn send_message(
    threads: &mut ChatThreads,
    passenger: &PassengerRecord,
    text: &str,
    replies: &dyn ReplyStrategy,
    rng: &mut dyn RngCore,
) -> SendOutcome {
    let text = text.trim();
    if text.is_empty() {
        return SendOutcome::Ignored;
    }

    let reply = replies.reply(text, passenger, rng);
    let thread = threads.entry(thread_key(passenger.id)).or_default();
    thread.push(ChatMessage {
        sender: VISITOR_SENDER.to_string(),
        text: text.to_string(),
    });
    thread.push(ChatMessage {
        sender: passenger.name.clone(),
        text: reply,
    });

    SendOutcome::Sent
}

pub fn thread_len(threads: &ChatThreads, passenger_id: u32) -> usize {
    threads
        .get(&thread_key(passenger_id))
        .map(Vec::len)
        .unwrap_or(0)
}
