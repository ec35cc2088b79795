//! External display artifact gateway.
//!
//! The chat platform hosting the status message is a consumed interface: the
//! engine only ever creates one message, edits it in place, or probes that it
//! still exists. Backends implement [`DisplayGateway`]; the rest of the
//! system is platform-agnostic.

/// Discord REST backend.
#[cfg(feature = "discord-display")]
pub mod discord;
/// Snapshot-to-content rendering.
pub mod render;

use std::error::Error;

use futures::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;

/// Result alias for gateway operations.
pub type DisplayResult<T> = Result<T, DisplayError>;

/// Opaque handle to the one external display message.
pub type MessageHandle = String;

/// Failures surfaced by a display gateway.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The referenced message no longer exists.
    #[error("display message not found")]
    NotFound,
    /// The external platform refuses the operation.
    #[error("display operation forbidden: {0}")]
    Forbidden(String),
    /// The request could not be sent.
    #[error("display transport failure")]
    Transport {
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The platform answered with an unexpected status.
    #[error("unexpected display response status {status}: {body}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Response body, for operator-visible diagnostics.
        body: String,
    },
}

impl DisplayError {
    /// Wrap any backend failure as a transport error.
    pub fn transport(source: impl Error + Send + Sync + 'static) -> Self {
        DisplayError::Transport {
            source: Box::new(source),
        }
    }
}

/// One field of the rendered embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field content.
    pub value: String,
    /// Whether the field may share a row with its neighbours.
    pub inline: bool,
}

/// Renderable embed for the status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    /// Embed title.
    pub title: String,
    /// Embed description (status line plus update timestamp).
    pub description: String,
    /// Embed fields in display order.
    pub fields: Vec<EmbedField>,
}

/// One entry of the target select menu attached to the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Label shown to the user.
    pub label: String,
    /// Target id carried by the option.
    pub value: String,
    /// Whether this option is the current selection.
    pub selected: bool,
}

/// Complete content of the display message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayContent {
    /// The status embed.
    pub embed: Embed,
    /// Select-menu options, one per tracked target. Empty when the registry
    /// is empty; backends omit the control entirely in that case.
    pub menu: Vec<SelectOption>,
}

/// Consumed interface to the chat platform hosting the display message.
pub trait DisplayGateway: Send + Sync {
    /// Create a new display message, returning its handle.
    fn create_message(&self, content: DisplayContent)
    -> BoxFuture<'static, DisplayResult<MessageHandle>>;
    /// Edit an existing display message in place.
    fn edit_message(
        &self,
        handle: MessageHandle,
        content: DisplayContent,
    ) -> BoxFuture<'static, DisplayResult<()>>;
    /// Check that the display message still exists.
    fn fetch_message(&self, handle: MessageHandle) -> BoxFuture<'static, DisplayResult<()>>;
}
