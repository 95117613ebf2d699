//! Shared infrastructure for the loomcrawl crawling engine: the error
//! taxonomy, the event/observability system, shutdown signalling, and the
//! sequence counter used for FIFO tie-breaking in the scheduler.

pub mod cancel;
pub mod error;
pub mod events;
pub mod seq;
pub mod spawn;

pub use cancel::{CancellationToken, ShutdownLevel};
pub use error::{ClientError, ControlFlow, EngineError, HttpError, PipelineFlow, TransportError};
pub use events::{BoxedEventListener, EngineEvent, EventListener, EventListeners, FnListener};
pub use seq::SequenceCounter;
pub use spawn::{Spawn, TokioSpawn};
