//! The type-keyed item pipeline dispatcher for loomcrawl.

pub mod config;
mod erased;
pub mod dispatcher;
pub mod events;
pub mod pipeline;

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use dispatcher::Dispatcher;
pub use events::PipelineEvent;
pub use pipeline::{AnyItem, BoxFuture, GlobalMiddleware, ItemMiddleware, Next, Pipeline};
