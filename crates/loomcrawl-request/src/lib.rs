//! Request/Response data model, middleware chain, HTTP adapter boundary,
//! Request Manager, and Dependency Resolver for loomcrawl.

pub mod adapter;
pub mod depend;
pub mod manager;
pub mod middleware;
pub mod model;

pub use adapter::{HttpAdapter, RawResponse};
#[cfg(feature = "reqwest")]
pub use adapter::ReqwestAdapter;
pub use depend::{Handler, ParamMap, Resolver};
pub use manager::{Failure, RequestManager, RequestManagerEvent, SendRequest, TriggerConfig};
pub use middleware::{MiddlewareChain, Phase, RequestMiddleware};
pub use model::{Body, Extra, HandlerId, Part, QueryValue, Request, RequestId, RequestMeta, Response};
