//! Diagnostic events emitted by the pipeline dispatcher.

use std::time::Instant;

use loomcrawl_core::EngineEvent;

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// An item whose type has no registered pipeline was passed through
    /// unmodified (non-strict mode only).
    UnknownItemPassthrough { type_name: &'static str, timestamp: Instant },
    /// `close` was invoked on a registered pipeline during shutdown.
    PipelineClosed { pipeline: String, timestamp: Instant },
}

impl EngineEvent for PipelineEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::UnknownItemPassthrough { .. } => "unknown_item_passthrough",
            PipelineEvent::PipelineClosed { .. } => "pipeline_closed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            PipelineEvent::UnknownItemPassthrough { timestamp, .. } => *timestamp,
            PipelineEvent::PipelineClosed { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        "pipeline"
    }
}
