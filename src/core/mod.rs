pub mod aggregator;
pub mod dashboard;
pub mod removal;
pub mod scan_session;
pub mod workflow;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use crate::domain::model::{MatchSummary, ParsedScan, ScanRecord, SubmitResult};
pub use crate::domain::ports::{ConfigProvider, ScoutingBackend};
pub use crate::utils::error::Result;
