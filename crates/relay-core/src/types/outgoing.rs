//! Outgoing message content and file attachments.

/// A file extracted from the reply (e.g. a long code block). Ownership moves to the platform send/edit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub description: String,
}

/// Content of one platform message: text plus attachments (only the trailing segment carries attachments).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingMessage {
    /// Text-only message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    /// Attaches files to this message.
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}
