//! Immutable description of a benchmark run.
//!
//! Everything a run needs is resolved up front into a [`RunConfig`],
//! so that workers never consult process-wide state.

mod method;
mod request;
mod run;

pub use self::{method::HttpMethod, request::RequestSpec, run::RunConfig};
