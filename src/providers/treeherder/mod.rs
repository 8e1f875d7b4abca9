mod client;
mod types;

pub use client::TreeherderClient;
pub use types::{Artifact, JobId, JobOutcome, JobRecord, ResultSet};
