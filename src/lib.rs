pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpBackend;
pub use config::ScoutConfig;
pub use core::{
    aggregator::{FailurePolicy, MatchRosterAggregator},
    dashboard::Dashboard,
    removal::RecordRemoval,
    scan_session::ScanSession,
    workflow::{ScanWorkflow, SessionPhase, SubmitOutcome},
};
pub use domain::model::{AllianceRoster, MatchKey, MatchSummary, COMPLETENESS_THRESHOLD};
pub use domain::ports::ScoutingBackend;
pub use utils::error::{Result, ScoutError};
