//! Diagnostic messages
//!
//! The interpreter never pops up dialogs or aborts on a bad command; it
//! records what happened in a [`MessageLog`] and keeps going. Callers
//! decide what to show the user.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessageLevel {
    /// Debug message
    Debug,
    /// Info message
    Info,
    /// Warning message
    Warning,
    /// Error message
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERR"),
        }
    }
}

/// A single user-facing message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message level
    pub level: MessageLevel,
    /// Message text
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Warning, text)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

/// Ordered collection of messages produced while reading a file
///
/// Every pushed message is also emitted as a `tracing` event at the
/// matching level.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message
    pub fn push(&mut self, message: Message) {
        match message.level {
            MessageLevel::Debug => tracing::debug!("{}", message.text),
            MessageLevel::Info => tracing::info!("{}", message.text),
            MessageLevel::Warning => tracing::warn!("{}", message.text),
            MessageLevel::Error => tracing::error!("{}", message.text),
        }
        self.messages.push(message);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Message::warning(text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages at or above `level`
    pub fn at_least(&self, level: MessageLevel) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.level >= level)
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
