//! Shared error taxonomy for loomcrawl.
//!
//! [`EngineError`] is the umbrella type raised by the framework itself (as
//! opposed to errors from user-supplied handlers). It wraps the three
//! categories named in the specification: misuse errors ([`ClientError`]),
//! terminal non-2xx responses ([`HttpError`]), and transport-level failures
//! ([`TransportError`]).
//!
//! Phase-local control signals (`StopMiddlewareProcessing`,
//! `StopRequestProcessing`, `StopItemProcessing`) are deliberately **not**
//! part of this enum — they are not errors, and must never reach a user
//! error handler. See [`ControlFlow`] and [`PipelineFlow`].

use std::time::Duration;

/// Errors caused by caller misuse rather than by the network or a remote
/// peer: a missing dependency, an item routed to no registered pipeline
/// under strict mode, or malformed request data.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// A handler declared a parameter name with no matching dependency,
    /// request extra, or default.
    #[error("missing dependency `{name}` required by handler `{handler}`")]
    DependencyMissing {
        /// The handler that could not be invoked.
        handler: String,
        /// The parameter name that could not be resolved.
        name: String,
    },

    /// An item was dispatched whose runtime type has no registered
    /// pipeline, and strict mode is enabled.
    #[error("no pipeline registered for item type `{type_name}`")]
    UnknownItem {
        /// The Rust type name of the unrouted item.
        type_name: &'static str,
    },

    /// A `Request` was built with data the engine cannot send as-is
    /// (e.g. a body variant that conflicts with the configured method).
    #[error("invalid request data: {reason}")]
    InvalidRequestData {
        /// Human-readable description of what was invalid.
        reason: String,
    },
}

/// A non-2xx response that survived the retry subsystem (or arrived with
/// retries disabled).
#[derive(Debug, Clone, thiserror::Error)]
#[error("HTTP {status} for {url}")]
pub struct HttpError {
    /// The final status code.
    pub status: u16,
    /// The request URL that produced the error.
    pub url: String,
}

/// Errors surfaced by the HTTP adapter before a response was obtained.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established or was reset mid-flight.
    #[error("connection failure: {0}")]
    ConnectionFailed(String),

    /// The request did not complete within its configured deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The peer violated the HTTP protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// The umbrella error type raised by the framework itself.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// Caller misuse; see [`ClientError`].
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Terminal non-2xx response; see [`HttpError`].
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Transport-level failure; see [`TransportError`].
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A `Request` was submitted after the scheduler's `close` was called.
    #[error("scheduler is shutting down, no new requests are accepted")]
    ShutdownInProgress,
}

impl EngineError {
    /// Returns `true` if this is a [`ClientError`].
    pub fn is_client(&self) -> bool {
        matches!(self, EngineError::Client(_))
    }

    /// Returns `true` if this is an [`HttpError`].
    pub fn is_http(&self) -> bool {
        matches!(self, EngineError::Http(_))
    }

    /// Returns `true` if this is a [`TransportError`].
    pub fn is_transport(&self) -> bool {
        matches!(self, EngineError::Transport(_))
    }

    /// Returns `true` if submission was rejected because of shutdown.
    pub fn is_shutdown_in_progress(&self) -> bool {
        matches!(self, EngineError::ShutdownInProgress)
    }
}

/// Outcome of invoking one middleware in a request-lifecycle phase.
///
/// This is deliberately not an error type: phase-local signals are caught
/// inside the phase that raised them and never surface to a user error
/// handler (see specification §7, "Propagation policy").
#[derive(Debug, Clone)]
pub enum ControlFlow<T> {
    /// Continue to the next middleware (or, if this was the last one, to
    /// the next phase) with the possibly-mutated value.
    Continue(T),
    /// Skip the remaining middlewares in this phase, but otherwise proceed
    /// normally (`StopMiddlewareProcessing`).
    StopPhase(T),
    /// Abort the entire request dispatch (`StopRequestProcessing`).
    StopRequest,
}

impl<T> ControlFlow<T> {
    /// Returns `true` if dispatch should continue past this phase.
    pub fn proceeds(&self) -> bool {
        !matches!(self, ControlFlow::StopRequest)
    }
}

/// Outcome of invoking one stage in the pipeline dispatcher.
#[derive(Debug, Clone)]
pub enum PipelineFlow<T> {
    /// Continue to the next stage with the possibly-transformed item.
    Continue(T),
    /// Skip the remaining pre/post middlewares in this half of the chain.
    StopPhase(T),
    /// Abort the whole dispatch, returning the item as-is
    /// (`StopItemProcessing`).
    StopItem(T),
}
