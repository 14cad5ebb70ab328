use crate::domain::model::{ScanRecord, TeamAverages};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The scouting backend as the scanning core sees it. Transport and wire
/// format belong to the implementation.
#[async_trait]
pub trait ScoutingBackend: Send + Sync {
    /// The six teams of one match, blue alliance first.
    async fn fetch_match_roster(&self, competition_code: &str, match_number: u32)
        -> Result<Vec<u32>>;

    /// Every scheduled match with its six teams, in the order the schedule
    /// source lists them.
    async fn fetch_all_match_rosters(&self, competition_code: &str)
        -> Result<Vec<(u32, Vec<u32>)>>;

    async fn fetch_scanned_count(&self, competition_code: &str, match_number: u32) -> Result<u32>;

    /// Returns the backend's confirmation or error text.
    async fn submit_scan(&self, competition_code: &str, token: &str) -> Result<String>;

    async fn delete_scan_record(
        &self,
        competition_code: &str,
        team_number: u32,
        match_number: u32,
    ) -> Result<()>;

    async fn fetch_match_records(
        &self,
        competition_code: &str,
        match_number: u32,
    ) -> Result<Vec<ScanRecord>>;

    async fn fetch_team_averages(&self, competition_code: &str) -> Result<Vec<TeamAverages>>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn concurrent_requests(&self) -> usize;
}
