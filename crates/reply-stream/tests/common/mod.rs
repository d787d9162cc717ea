//! Recording [`MessageSink`] for synchronizer tests.
//!
//! Records every create/edit so tests can assert on call order, targets and content without a platform.

use async_trait::async_trait;
use relay_core::{OutgoingMessage, RelayError, Result};
use reply_stream::MessageSink;
use std::sync::Mutex;

/// One recorded sink call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Create {
        id: String,
        is_first: bool,
        previous_id: Option<String>,
        message: OutgoingMessage,
    },
    Edit {
        id: String,
        message: OutgoingMessage,
    },
}

/// Sink that assigns ids `m1`, `m2`, ... and records calls. `fail_on_call` makes the n-th call (1-based) fail.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    next_id: Mutex<usize>,
    fail_on_call: Option<usize>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_ids(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::Create { id, .. } => Some(id),
                SinkCall::Edit { .. } => None,
            })
            .collect()
    }

    pub fn edits_of(&self, target: &str) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::Edit { id, message } if id == target => Some(message),
                _ => None,
            })
            .collect()
    }

    fn check_failure(&self) -> Result<()> {
        let made = self.calls.lock().unwrap().len() + 1;
        if self.fail_on_call == Some(made) {
            return Err(RelayError::Platform("simulated platform failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn on_new_message(
        &self,
        is_first: bool,
        previous_id: Option<&str>,
        message: OutgoingMessage,
    ) -> Result<String> {
        self.check_failure()?;
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("m{}", *next)
        };
        self.calls.lock().unwrap().push(SinkCall::Create {
            id: id.clone(),
            is_first,
            previous_id: previous_id.map(str::to_string),
            message,
        });
        Ok(id)
    }

    async fn edit_message(&self, message_id: &str, message: OutgoingMessage) -> Result<()> {
        self.check_failure()?;
        self.calls.lock().unwrap().push(SinkCall::Edit {
            id: message_id.to_string(),
            message,
        });
        Ok(())
    }
}
