use crate::domain::model::{RecordMatch, ScanRecord, TeamAverages};
use crate::domain::ports::ScoutingBackend;
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

fn unreachable_backend(what: &str) -> ScoutError {
    ScoutError::HttpStatus {
        status: 503,
        url: format!("mock://{}", what),
    }
}

/// In-memory backend that records every write it receives.
#[derive(Clone, Default)]
pub struct MockBackend {
    rosters: HashMap<u32, Vec<u32>>,
    schedule: Vec<(u32, Vec<u32>)>,
    counts: HashMap<u32, u32>,
    failing_counts: HashSet<u32>,
    fail_rosters: bool,
    fail_submit: bool,
    fail_records: bool,
    fail_delete: bool,
    fail_averages: bool,
    submit_reply: String,
    averages: Vec<TeamAverages>,
    records: Arc<Mutex<Vec<ScanRecord>>>,
    submitted: Arc<Mutex<Vec<(String, String)>>>,
    count_requests: Arc<Mutex<Vec<u32>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            submit_reply: "Team added".to_string(),
            ..Default::default()
        }
    }

    pub fn with_match(mut self, match_number: u32, teams: &[u32], scanned: u32) -> Self {
        self.rosters.insert(match_number, teams.to_vec());
        self.schedule.push((match_number, teams.to_vec()));
        self.counts.insert(match_number, scanned);
        self
    }

    pub fn with_failing_count(mut self, match_number: u32) -> Self {
        self.failing_counts.insert(match_number);
        self
    }

    pub fn with_failing_rosters(mut self) -> Self {
        self.fail_rosters = true;
        self
    }

    pub fn with_failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    pub fn with_failing_records(mut self) -> Self {
        self.fail_records = true;
        self
    }

    pub fn with_failing_averages(mut self) -> Self {
        self.fail_averages = true;
        self
    }

    pub fn with_failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn with_submit_reply(mut self, reply: &str) -> Self {
        self.submit_reply = reply.to_string();
        self
    }

    pub fn with_averages(mut self, averages: Vec<TeamAverages>) -> Self {
        self.averages = averages;
        self
    }

    pub fn with_record(self, team_number: u32, match_number: u32) -> Self {
        let record = ScanRecord {
            match_info: RecordMatch { match_number },
            team_number,
            scouter_name: "mock".to_string(),
            starting_position: 1,
            passed_starting_line: 1,
            scored_first_shot: 0,
            auto_close_notes_scored: 2,
            auto_far_notes_scored: 0,
            teleop_speaker_notes: 5,
            teleop_amp_notes: 1,
            teleop_notes_fed: 0,
            defense_rating: 3,
            mechanical_failure: 0,
            end_location: 2,
            scored_trap_note: 0,
            comments: String::new(),
        };
        self.records.try_lock().expect("fresh mock").push(record);
        self
    }

    pub async fn submitted(&self) -> Vec<(String, String)> {
        self.submitted.lock().await.clone()
    }

    pub async fn count_requests(&self) -> Vec<u32> {
        self.count_requests.lock().await.clone()
    }
}

#[async_trait]
impl ScoutingBackend for MockBackend {
    async fn fetch_match_roster(&self, _competition_code: &str, match_number: u32) -> Result<Vec<u32>> {
        if self.fail_rosters {
            return Err(unreachable_backend("roster"));
        }
        self.rosters
            .get(&match_number)
            .cloned()
            .ok_or_else(|| unreachable_backend("roster"))
    }

    async fn fetch_all_match_rosters(&self, _competition_code: &str) -> Result<Vec<(u32, Vec<u32>)>> {
        if self.fail_rosters {
            return Err(unreachable_backend("schedule"));
        }
        Ok(self.schedule.clone())
    }

    async fn fetch_scanned_count(&self, _competition_code: &str, match_number: u32) -> Result<u32> {
        self.count_requests.lock().await.push(match_number);
        tokio::task::yield_now().await;
        if self.failing_counts.contains(&match_number) {
            return Err(unreachable_backend("count"));
        }
        Ok(self.counts.get(&match_number).copied().unwrap_or(0))
    }

    async fn submit_scan(&self, competition_code: &str, token: &str) -> Result<String> {
        if self.fail_submit {
            return Err(unreachable_backend("submit"));
        }
        self.submitted
            .lock()
            .await
            .push((competition_code.to_string(), token.to_string()));
        Ok(self.submit_reply.clone())
    }

    async fn delete_scan_record(
        &self,
        _competition_code: &str,
        team_number: u32,
        match_number: u32,
    ) -> Result<()> {
        if self.fail_delete {
            return Err(unreachable_backend("delete"));
        }
        self.records
            .lock()
            .await
            .retain(|r| !(r.team_number == team_number && r.match_number() == match_number));
        Ok(())
    }

    async fn fetch_match_records(
        &self,
        _competition_code: &str,
        match_number: u32,
    ) -> Result<Vec<ScanRecord>> {
        if self.fail_records {
            return Err(unreachable_backend("records"));
        }
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| r.match_number() == match_number)
            .cloned()
            .collect())
    }

    async fn fetch_team_averages(&self, _competition_code: &str) -> Result<Vec<TeamAverages>> {
        if self.fail_averages {
            return Err(unreachable_backend("averages"));
        }
        Ok(self.averages.clone())
    }
}
