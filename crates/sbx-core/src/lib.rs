pub mod config;
pub mod logging;

pub mod context;
pub mod control;
pub mod endpoint;
pub mod error;
pub mod index;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod transport;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::FetchContext;
pub use error::{ErrorKind, FetchError};
pub use model::{Page, Project};
pub use pipeline::{fetch_project, RunReport};
