//! Domain types.

mod build;
mod cluster;
mod ensure;
mod prune;
mod secret;

pub use build::BuildSpec;
pub use cluster::{RemoteSecret, ServiceSummary, Task};
pub use ensure::EnsureResult;
pub use prune::PruneReport;
pub use secret::LogicalSecret;
