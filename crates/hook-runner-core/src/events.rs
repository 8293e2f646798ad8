//! Event model and the decoder/callback contract.
//!
//! Events are an open set. The core only knows that an event can name its
//! own type; embedders define as many concrete event types as they like and
//! recover them in their callback with [`downcast_ref`](trait.Event.html#method.downcast_ref).
//!
//! There is no catch-all decoder. Webhook payloads carry a huge number of
//! fields, so embedders are expected to declare event types with only the
//! fields they care about and fall back to [`decode_minimal`] for the rest:
//!
//! ```rust
//! use hook_runner_core::{decode_minimal, DecodeResult, Event};
//!
//! #[derive(Debug)]
//! struct ForkEvent {
//!     payload_len: usize,
//! }
//!
//! impl Event for ForkEvent {
//!     fn event_type(&self) -> &str {
//!         "fork"
//!     }
//! }
//!
//! fn my_decoder(event_type: &str, payload: &[u8]) -> DecodeResult {
//!     match event_type {
//!         "fork" => Ok(Some(Box::new(ForkEvent { payload_len: payload.len() }))),
//!         _ => decode_minimal(event_type, payload),
//!     }
//! }
//!
//! let event = my_decoder("fork", b"{}").unwrap().unwrap();
//! assert_eq!(event.downcast_ref::<ForkEvent>().unwrap().payload_len, 2);
//! assert!(my_decoder("ping", b"{}").unwrap().is_some());
//! assert!(my_decoder("star", b"{}").unwrap().is_none());
//! ```

use async_trait::async_trait;
use std::any::Any;
use std::fmt;

/// Event type tag of the connectivity check sent when a webhook is created.
pub const PING_EVENT_TYPE: &str = "ping";

// ============================================================================
// Event
// ============================================================================

/// Access to a value as [`Any`], implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A decoded webhook event.
pub trait Event: AsAny + Send + Sync + fmt::Debug + 'static {
    /// The event type the decoder was asked for when it produced this event,
    /// e.g. `"push"` or `"ping"`.
    fn event_type(&self) -> &str;
}

impl dyn Event {
    /// Returns `true` if the event is of concrete type `T`.
    pub fn is<T: Event>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Borrow the event as concrete type `T`.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Event produced by [`MinimalEventDecoder`] for `X-GitHub-Event: ping`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingEvent;

impl Event for PingEvent {
    fn event_type(&self) -> &str {
        PING_EVENT_TYPE
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Error returned by a decoder. Its `Display` text is sent to the client.
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of decoding one payload.
///
/// * `Ok(Some(event))` - the event type is handled and the payload decoded
/// * `Ok(None)` - the event type is not handled by this decoder
/// * `Err(e)` - the event type is handled but the payload is malformed
pub type DecodeResult = Result<Option<Box<dyn Event>>, DecodeError>;

/// Maps an event type tag and its JSON payload to an [`Event`].
///
/// Unrecognized event types must yield `Ok(None)`, never an error, so that
/// "not interested" stays distinguishable from "malformed". Decoders should
/// at least recognize `ping`; delegating to [`decode_minimal`] does that.
///
/// Implemented for any `Fn(&str, &[u8]) -> DecodeResult`.
pub trait EventDecoder: Send + Sync {
    fn decode(&self, event_type: &str, payload: &[u8]) -> DecodeResult;
}

impl<F> EventDecoder for F
where
    F: Fn(&str, &[u8]) -> DecodeResult + Send + Sync,
{
    fn decode(&self, event_type: &str, payload: &[u8]) -> DecodeResult {
        self(event_type, payload)
    }
}

/// Decoder used when the embedder does not supply one.
///
/// Recognizes only `ping`; every other event type yields `Ok(None)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalEventDecoder;

impl EventDecoder for MinimalEventDecoder {
    fn decode(&self, event_type: &str, payload: &[u8]) -> DecodeResult {
        decode_minimal(event_type, payload)
    }
}

/// Function form of [`MinimalEventDecoder`], convenient as the fallback arm
/// of a custom decoder.
pub fn decode_minimal(event_type: &str, _payload: &[u8]) -> DecodeResult {
    if event_type == PING_EVENT_TYPE {
        return Ok(Some(Box::new(PingEvent)));
    }
    Ok(None)
}

// ============================================================================
// Callback
// ============================================================================

/// Receives every authenticated and decoded event.
///
/// Called once per successful request, inside the request's lifecycle: the
/// HTTP response is sent only after `on_event` returns. Implementations that
/// do slow work and want fast responses must offload it themselves.
#[async_trait]
pub trait EventCallback: Send + Sync {
    async fn on_event(&self, delivery_id: &str, event: Box<dyn Event>);
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
