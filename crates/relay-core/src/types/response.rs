//! Handler chain result type.

/// Handler result for the chain. `Reply(message_id)` carries the first emitted reply id so later handlers can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; nothing was emitted (or the exchange failed).
    Stop,
    /// Stop the chain; the reply was emitted starting at the given platform message id.
    Reply(String),
}
