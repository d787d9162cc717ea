//! Reply parts and the append-only part log.

use relay_core::FailureCause;

/// One atomic unit of reply content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// The user's request; always first, rendered truncated.
    Prompt { text: String },
    /// Assistant text accrued since the previous tool call.
    TextFragment { text: String },
    /// A named tool is being (or was) called.
    ToolInvocation { tool_name: String },
    /// Error reported while streaming.
    Failure { cause: FailureCause },
}

impl Part {
    pub fn prompt(text: impl Into<String>) -> Self {
        Part::Prompt { text: text.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Part::TextFragment { text: text.into() }
    }

    pub fn tool(tool_name: impl Into<String>) -> Self {
        Part::ToolInvocation {
            tool_name: tool_name.into(),
        }
    }

    pub fn failure(cause: FailureCause) -> Self {
        Part::Failure { cause }
    }

    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Prompt { .. } => "prompt",
            Part::TextFragment { .. } => "text",
            Part::ToolInvocation { .. } => "tool-call",
            Part::Failure { .. } => "error",
        }
    }
}

/// Ordered record of everything produced so far for one reply. No removal or mutation API.
#[derive(Debug, Clone, Default)]
pub struct PartLog {
    parts: Vec<Part>,
}

impl PartLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// All parts in rendering order.
    pub fn all(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut log = PartLog::new();
        assert!(log.is_empty());
        log.append(Part::prompt("hi"));
        log.append(Part::text("hello"));
        log.append(Part::tool("MathTool"));
        assert_eq!(log.len(), 3);
        let kinds: Vec<_> = log.all().iter().map(Part::kind).collect();
        assert_eq!(kinds, vec!["prompt", "text", "tool-call"]);
    }
}
