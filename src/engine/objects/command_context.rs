//! Per-session evaluation context. Read-only from the rewriter's point of
//! view; `env()` style functions fold against it.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct CommandContext {
    pub session_id: Uuid,
    /// Captured once when the context is built so folding is stable for the
    /// life of the command.
    pub now: NaiveDateTime,
    properties: HashMap<String, String>,
}

impl CommandContext {
    pub fn new(session_id: Uuid, now: NaiveDateTime) -> CommandContext {
        CommandContext {
            session_id,
            now,
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: &str) -> CommandContext {
        self.properties.insert(key.to_uppercase(), value.to_string());
        self
    }

    pub fn property(&self, key: &str) -> Option<&String> {
        self.properties.get(&key.to_uppercase())
    }
}
