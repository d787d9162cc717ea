//! Message synchronizer: on every new part, re-renders, re-chunks and reconciles segments against the
//! platform messages already emitted (edit the trailing one, create the rest).
//!
//! # Entry points
//!
//! - **[`ReplySynchronizer::on_part`]** – Appends a part and brings the platform up to date.
//! - **[`ReplySynchronizer::first_message_id`]** – Id of the first emitted message; the session persistence key.
//! - **[`MessageSink`]** – Injected create/edit primitives; [`PlatformSink`] binds them to a [`Platform`].

use async_trait::async_trait;
use dashmap::DashMap;
use relay_core::{Attachment, Chat, OutgoingMessage, Platform, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::chunk::split_segments;
use crate::config::StreamConfig;
use crate::part::{Part, PartLog};
use crate::render::{Rendered, Renderer};

/// Create/edit primitives used by the synchronizer. Failures propagate to the caller of `on_part`.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Creates a message. The first one (`is_first`) answers the trigger; later ones follow up on `previous_id`.
    async fn on_new_message(
        &self,
        is_first: bool,
        previous_id: Option<&str>,
        message: OutgoingMessage,
    ) -> Result<String>;

    /// Replaces the content of an already-created message.
    async fn edit_message(&self, message_id: &str, message: OutgoingMessage) -> Result<()>;
}

/// [`MessageSink`] over a [`Platform`] for one chat and one triggering message.
///
/// Each attachment file name is handed to the platform once per message; repeated edits of the same
/// message carry only files it has not received yet. The record lives as long as the sink (one reply).
pub struct PlatformSink {
    platform: Arc<dyn Platform>,
    chat: Chat,
    trigger_message_id: Option<String>,
    /// Message id → attachment file names already delivered with it.
    delivered: DashMap<String, HashSet<String>>,
}

impl PlatformSink {
    pub fn new(platform: Arc<dyn Platform>, chat: Chat, trigger_message_id: Option<String>) -> Self {
        Self {
            platform,
            chat,
            trigger_message_id,
            delivered: DashMap::new(),
        }
    }

    fn record_delivered(&self, message_id: &str, attachments: &[Attachment]) {
        if attachments.is_empty() {
            return;
        }
        self.delivered
            .entry(message_id.to_string())
            .or_default()
            .extend(attachments.iter().map(|a| a.filename.clone()));
    }

    /// Drops attachments already delivered with `message_id`.
    fn undelivered(&self, message_id: &str, attachments: Vec<Attachment>) -> Vec<Attachment> {
        match self.delivered.get(message_id) {
            Some(sent) => attachments
                .into_iter()
                .filter(|a| !sent.contains(&a.filename))
                .collect(),
            None => attachments,
        }
    }
}

#[async_trait]
impl MessageSink for PlatformSink {
    async fn on_new_message(
        &self,
        is_first: bool,
        previous_id: Option<&str>,
        message: OutgoingMessage,
    ) -> Result<String> {
        let attachments = message.attachments.clone();
        let id = match (is_first, previous_id) {
            (false, Some(previous)) => self.platform.reply(&self.chat, previous, message).await?,
            _ => {
                self.platform
                    .send_initial(&self.chat, self.trigger_message_id.as_deref(), message)
                    .await?
            }
        };
        self.record_delivered(&id, &attachments);
        Ok(id)
    }

    async fn edit_message(&self, message_id: &str, mut message: OutgoingMessage) -> Result<()> {
        message.attachments = self.undelivered(message_id, message.attachments);
        let attachments = message.attachments.clone();
        self.platform.edit(&self.chat, message_id, message).await?;
        self.record_delivered(message_id, &attachments);
        Ok(())
    }
}

/// Reconciliation state carried between parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// Last segment index that is bound to a message and may still be edited.
    pub last_stable_index: usize,
    /// Most recently created message (bound to `last_stable_index`).
    pub current_message_id: Option<String>,
    pub first_message_id: Option<String>,
}

/// What one `on_part` call did to the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub segment_count: usize,
    /// Index of the message edited in place, if any (at most one per pass).
    pub edited: Option<usize>,
    /// Indexes of newly created messages, ascending.
    pub created: Vec<usize>,
}

/// Drives one reply: owns the part log and the reconciliation state.
pub struct ReplySynchronizer<S: MessageSink> {
    log: PartLog,
    renderer: Renderer,
    segment_limit: usize,
    sink: S,
    state: SyncState,
}

impl<S: MessageSink> ReplySynchronizer<S> {
    pub fn new(config: StreamConfig, sink: S) -> Self {
        Self {
            log: PartLog::new(),
            segment_limit: config.segment_limit,
            renderer: Renderer::new(config),
            sink,
            state: SyncState::default(),
        }
    }

    /// Appends `part`, re-renders and re-chunks the whole log, then edits the message at the last stable
    /// index (if one exists) and creates messages for every index after it. Each platform call is awaited
    /// before the next one.
    #[instrument(skip(self, part), fields(part = part.kind(), parts = self.log.len() + 1))]
    pub async fn on_part(&mut self, part: Part) -> Result<PassReport> {
        self.log.append(part);

        let Rendered { text, attachments } = self.renderer.render(self.log.all());
        let segments = split_segments(&text, self.segment_limit);
        let mut report = PassReport {
            segment_count: segments.len(),
            ..PassReport::default()
        };
        let Some(last_index) = segments.len().checked_sub(1) else {
            return Ok(report);
        };

        let mut attachments = Some(attachments).filter(|a| !a.is_empty());

        for (index, segment) in segments
            .into_iter()
            .enumerate()
            .skip(self.state.last_stable_index)
        {
            let mut message = OutgoingMessage::text(segment);
            if index == last_index {
                if let Some(files) = attachments.take() {
                    message = message.with_attachments(files);
                }
            }

            match self.state.current_message_id.clone() {
                Some(message_id) if index == self.state.last_stable_index => {
                    debug!(segment_index = index, message_id = %message_id, "Editing trailing message");
                    self.sink.edit_message(&message_id, message).await?;
                    report.edited = Some(index);
                }
                previous => {
                    let is_first = previous.is_none();
                    let message_id = self
                        .sink
                        .on_new_message(is_first, previous.as_deref(), message)
                        .await?;
                    debug!(segment_index = index, message_id = %message_id, is_first, "Created message");
                    if is_first {
                        self.state.first_message_id = Some(message_id.clone());
                    }
                    self.state.current_message_id = Some(message_id);
                    report.created.push(index);
                }
            }
        }

        self.state.last_stable_index = last_index;
        Ok(report)
    }

    /// Id of the first emitted message, once one exists.
    pub fn first_message_id(&self) -> Option<&str> {
        self.state.first_message_id.as_deref()
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn parts(&self) -> &[Part] {
        self.log.all()
    }

    /// Current rendering of the log (what the emitted messages add up to).
    pub fn rendered(&self) -> Rendered {
        self.renderer.render(self.log.all())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
