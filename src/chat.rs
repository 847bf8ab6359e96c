use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sending,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a reply is still pending")]
    Busy,
    #[error("message is empty")]
    Empty,
}

/// Handle for the reply owed to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub message_id: u64,
    pub prompt: String,
}

/// Chat log plus the Idle/Sending guard. Lives for the whole program run.
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    state: SessionState,
    input: String,
    next_id: u64,
    pub open: bool,
}

impl ChatSession {
    pub fn new(greeting: &str) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            state: SessionState::Idle,
            input: String::new(),
            next_id: 1,
            open: false,
        };
        if !greeting.trim().is_empty() {
            session.append(greeting.to_string(), Sender::Agent);
        }
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == SessionState::Sending
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns false when the input is disabled.
    pub fn push_input(&mut self, c: char) -> bool {
        if self.is_sending() {
            return false;
        }
        self.input.push(c);
        true
    }

    pub fn pop_input(&mut self) {
        if !self.is_sending() {
            self.input.pop();
        }
    }

    /// Submits the current input line.
    pub fn submit_input(&mut self) -> Result<PendingReply, SubmitError> {
        let text = self.input.clone();
        let pending = self.submit(&text)?;
        self.input.clear();
        Ok(pending)
    }

    pub fn submit(&mut self, text: &str) -> Result<PendingReply, SubmitError> {
        if self.is_sending() {
            warn!("chat submission rejected while a reply is pending");
            return Err(SubmitError::Busy);
        }
        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        let message_id = self.append(text.to_string(), Sender::User);
        self.state = SessionState::Sending;
        debug!(message_id, "chat message accepted");
        Ok(PendingReply {
            message_id,
            prompt: text.to_string(),
        })
    }

    /// Appends the agent reply and re-enables input. Returns false if no reply
    /// was pending.
    pub fn resolve(&mut self, reply: String) -> bool {
        if !self.is_sending() {
            warn!("dropping chat reply with nothing pending");
            return false;
        }
        let reply_to = self
            .messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::User)
            .map(|m| m.id);
        let id = self.append(reply, Sender::Agent);
        self.state = SessionState::Idle;
        debug!(id, ?reply_to, "chat reply delivered");
        true
    }

    fn append(&mut self, text: String, sender: Sender) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            text,
            sender,
            timestamp: Local::now(),
        });
        id
    }
}

pub fn lock_session(session: &Arc<Mutex<ChatSession>>) -> MutexGuard<'_, ChatSession> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Waits `delay`, then appends `reply` to the session.
pub async fn deliver_reply(session: Arc<Mutex<ChatSession>>, reply: String, delay: Duration) {
    tokio::time::sleep(delay).await;
    lock_session(&session).resolve(reply);
}
