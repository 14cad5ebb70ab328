use crate::core::{Result, ScanRecord, ScoutingBackend};
use crate::utils::error::ScoutError;

pub const DELETE_SUCCEEDED: &str = "Record deleted successfully";
pub const DELETE_FAILED: &str = "Error deleting record";
pub const SEARCH_FAILED: &str = "Error fetching records";

/// Finds the stored records of one match and removes erroneous ones.
pub struct RecordRemoval<B: ScoutingBackend> {
    backend: B,
    competition_code: Option<String>,
    records: Vec<ScanRecord>,
    status: Option<String>,
}

impl<B: ScoutingBackend> RecordRemoval<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            competition_code: None,
            records: Vec::new(),
            status: None,
        }
    }

    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub async fn search(&mut self, competition_code: &str, match_number: u32) -> Result<&[ScanRecord]> {
        self.competition_code = Some(competition_code.to_string());

        match self
            .backend
            .fetch_match_records(competition_code, match_number)
            .await
        {
            Ok(records) => {
                tracing::debug!(
                    "Found {} records for {}/{}",
                    records.len(),
                    competition_code,
                    match_number
                );
                self.records = records;
                self.status = None;
                Ok(&self.records)
            }
            Err(e) => {
                tracing::warn!("Record search failed: {}", e);
                self.status = Some(SEARCH_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Deletes one record of the searched competition, then reloads the
    /// records of its match.
    pub async fn delete(&mut self, team_number: u32, match_number: u32) -> Result<()> {
        let Some(competition_code) = self.competition_code.clone() else {
            self.status = Some(ScoutError::NoActiveMatch.user_friendly_message());
            return Err(ScoutError::NoActiveMatch);
        };

        let deleted = match self
            .backend
            .delete_scan_record(&competition_code, team_number, match_number)
            .await
        {
            Ok(()) => {
                self.backend
                    .fetch_match_records(&competition_code, match_number)
                    .await
            }
            Err(e) => Err(e),
        };

        match deleted {
            Ok(records) => {
                tracing::info!(
                    "Deleted record of team {} in match {}/{}",
                    team_number,
                    competition_code,
                    match_number
                );
                self.records = records;
                self.status = Some(DELETE_SUCCEEDED.to_string());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Record deletion failed: {}", e);
                self.status = Some(DELETE_FAILED.to_string());
                Err(e)
            }
        }
    }
}
