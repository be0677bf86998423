//! Bounded, ordered record of the turns exchanged in one conversation.
//!
//! ```rust
//! use pchat::{History, Turn};
//!
//! let mut history = History::with_capacity(2);
//! history.append(Turn::user("one"));
//! history.append(Turn::assistant("two"));
//! history.append(Turn::user("three"));
//!
//! let texts: Vec<_> = history.snapshot().iter().map(|turn| turn.text.clone()).collect();
//! assert_eq!(texts, vec!["two", "three"]);
//! ```

use std::collections::VecDeque;

use pprovider::{Message, Role};

/// Twenty entries, i.e. ten user/assistant exchanges.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    pub fn to_message(&self) -> Message {
        let role = match self.speaker {
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        };
        Message::new(role, self.text.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero capacity is raised to one so the newest turn is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        self.trim();
    }

    pub fn extend(&mut self, turns: impl IntoIterator<Item = Turn>) {
        self.turns.extend(turns);
        self.trim();
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    /// Drops the oldest turns until the history fits its capacity.
    pub fn trim(&mut self) {
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
