//! # Hook-Runner Core
//!
//! Authentication and dispatch core for GitHub and Gitea webhooks.
//!
//! The crate turns one inbound HTTP request into at most one invocation of an
//! embedder-supplied callback:
//!
//! 1. Reject anything that is not a `POST` (405)
//! 2. Read the body, capped at [`MAX_BODY_SIZE`] (500 on failure)
//! 3. Verify the `X-Hub-Signature` (HMAC-SHA1) or `X-Gitea-Signature`
//!    (HMAC-SHA256) header (401 on failure)
//! 4. Decode the `X-GitHub-Event` type through an [`EventDecoder`]
//!    (400 on decode error, 501 when the type is not handled)
//! 5. Invoke the [`EventCallback`] and respond 204
//!
//! ## Usage
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use hook_runner_core::{Event, EventCallback, SecretKey, WebhookHandler};
//! use std::sync::Arc;
//!
//! struct LogCallback;
//!
//! #[async_trait]
//! impl EventCallback for LogCallback {
//!     async fn on_event(&self, delivery_id: &str, event: Box<dyn Event>) {
//!         println!("{delivery_id}: {}", event.event_type());
//!     }
//! }
//!
//! # async fn example() -> std::io::Result<()> {
//! let handler = WebhookHandler::new(SecretKey::new("verysecret"), Arc::new(LogCallback));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, handler.into_router()).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod handler;
pub mod signature;

pub use error::WebhookError;
pub use events::{
    decode_minimal, AsAny, DecodeError, DecodeResult, Event, EventCallback, EventDecoder,
    MinimalEventDecoder, PingEvent, PING_EVENT_TYPE,
};
pub use handler::{WebhookHandler, DELIVERY_ID_HEADER, EVENT_TYPE_HEADER, MAX_BODY_SIZE};
pub use signature::{
    verify_gitea_style, verify_github_style, verify_request, SecretKey, SignatureError,
    SignatureScheme, GITEA_SIGNATURE_HEADER, GITHUB_SIGNATURE_HEADER,
};
