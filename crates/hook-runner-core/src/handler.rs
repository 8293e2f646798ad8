//! HTTP entry point for webhook deliveries.
//!
//! [`WebhookHandler`] runs every request through a strict linear gate. Each
//! stage either passes the request on or ends it with a fixed response:
//!
//! | Stage | Failure status |
//! |-------|----------------|
//! | Method is `POST` | 405 |
//! | Body read (capped at [`MAX_BODY_SIZE`]) | 500 |
//! | Signature check | 401 |
//! | Event decode | 400 (decode error) / 501 (unsupported type) |
//! | Callback | never fails, responds 204 |
//!
//! The handler does not route on paths. [`WebhookHandler::into_router`]
//! installs it as the fallback of an otherwise empty router, so wrap it in
//! another router when it should only answer on one path.

use crate::error::WebhookError;
use crate::events::{EventCallback, EventDecoder, MinimalEventDecoder};
use crate::signature::{
    verify_request, SecretKey, GITEA_SIGNATURE_HEADER, GITHUB_SIGNATURE_HEADER,
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, field, info, instrument, warn, Span};

/// Header carrying the event type tag, e.g. `push`.
pub const EVENT_TYPE_HEADER: &str = "x-github-event";

/// Header carrying the sender's opaque per-delivery identifier.
pub const DELIVERY_ID_HEADER: &str = "x-github-delivery";

/// Upper bound on the request body. GitHub caps payloads at 25 MiB.
pub const MAX_BODY_SIZE: usize = 25 << 20;

/// Authenticates webhook deliveries and hands decoded events to a callback.
///
/// All state is read-only once constructed, so one handler serves any number
/// of concurrent requests without locking.
///
/// # Examples
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use hook_runner_core::{decode_minimal, Event, EventCallback, SecretKey, WebhookHandler};
/// use std::sync::Arc;
///
/// struct Printer;
///
/// #[async_trait]
/// impl EventCallback for Printer {
///     async fn on_event(&self, delivery_id: &str, event: Box<dyn Event>) {
///         println!("{delivery_id}: {}", event.event_type());
///     }
/// }
///
/// let handler = WebhookHandler::new(SecretKey::new("verysecret"), Arc::new(Printer))
///     .with_decoder(Arc::new(decode_minimal));
/// let app: axum::Router = axum::Router::new().nest_service("/hooks", handler.into_router());
/// ```
pub struct WebhookHandler {
    secret_key: SecretKey,
    decoder: Arc<dyn EventDecoder>,
    callback: Arc<dyn EventCallback>,
}

impl WebhookHandler {
    /// Create a handler that decodes with [`MinimalEventDecoder`].
    pub fn new(secret_key: SecretKey, callback: Arc<dyn EventCallback>) -> Self {
        Self {
            secret_key,
            decoder: Arc::new(MinimalEventDecoder),
            callback,
        }
    }

    /// Replace the event decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn EventDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Wrap the handler in a router that sends every request to it.
    pub fn into_router(self) -> Router {
        Router::new()
            .fallback(serve_webhook)
            .with_state(Arc::new(self))
    }

    /// Process one request and build its HTTP response.
    pub async fn respond(&self, request: Request) -> Response {
        match self.handle(request).await {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(e) => e.into_response(),
        }
    }

    /// Process one request.
    ///
    /// Returns `Ok(())` once the callback has been invoked and has returned.
    ///
    /// # Errors
    ///
    /// Returns the [`WebhookError`] of the first stage that rejected the
    /// request. The callback is not invoked in that case.
    #[instrument(
        skip(self, request),
        fields(
            method = %request.method(),
            delivery_id = field::Empty,
            event_type = field::Empty,
        )
    )]
    pub async fn handle(&self, request: Request) -> Result<(), WebhookError> {
        let (parts, body) = request.into_parts();

        if parts.method != Method::POST {
            debug!("Rejecting webhook request with non-POST method");
            return Err(WebhookError::MethodNotAllowed);
        }

        let delivery_id = header_value(&parts.headers, DELIVERY_ID_HEADER).unwrap_or_default();
        let event_type = header_value(&parts.headers, EVENT_TYPE_HEADER).unwrap_or_default();
        let span = Span::current();
        span.record("delivery_id", field::display(&delivery_id));
        span.record("event_type", field::display(&event_type));

        let body = axum::body::to_bytes(body, MAX_BODY_SIZE)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read webhook body");
                WebhookError::BodyUnreadable {
                    message: e.to_string(),
                }
            })?;

        let github_signature = header_value(&parts.headers, GITHUB_SIGNATURE_HEADER);
        let gitea_signature = header_value(&parts.headers, GITEA_SIGNATURE_HEADER);
        let scheme = verify_request(
            &self.secret_key,
            github_signature.as_deref(),
            gitea_signature.as_deref(),
            &body,
        )
        .map_err(|e| {
            warn!(error = %e, "Webhook signature rejected");
            WebhookError::from(e)
        })?;
        debug!(scheme = %scheme, "Webhook signature validated");

        let event = match self.decoder.decode(&event_type, &body) {
            Ok(Some(event)) => event,
            Ok(None) => {
                debug!("Event type not handled by decoder");
                return Err(WebhookError::UnsupportedEventType);
            }
            Err(e) => {
                warn!(error = %e, "Failed to decode webhook payload");
                return Err(WebhookError::DecodeFailure {
                    message: e.to_string(),
                });
            }
        };

        info!("Dispatching webhook event");
        self.callback.on_event(&delivery_id, event).await;

        Ok(())
    }
}

impl std::fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("secret_key", &self.secret_key)
            .finish_non_exhaustive()
    }
}

async fn serve_webhook(State(handler): State<Arc<WebhookHandler>>, request: Request) -> Response {
    handler.respond(request).await
}

/// First value of a header as text. Bytes that are not UTF-8 are replaced,
/// which makes such a signature fail verification instead of looking absent.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
