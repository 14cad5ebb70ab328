use crate::core::{Result, ScoutingBackend};
use crate::domain::model::{Metric, TeamAverages};
use std::cmp::Ordering;

pub const DEFAULT_COMPETITION: &str = "2024mimus";

/// Server-computed team averages for one competition, viewed one metric at
/// a time.
pub struct Dashboard<B: ScoutingBackend> {
    backend: B,
    competition_code: Option<String>,
    teams: Vec<TeamAverages>,
}

impl<B: ScoutingBackend> Dashboard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            competition_code: None,
            teams: Vec::new(),
        }
    }

    pub fn competition_code(&self) -> Option<&str> {
        self.competition_code.as_deref()
    }

    pub fn teams(&self) -> &[TeamAverages] {
        &self.teams
    }

    pub async fn load(&mut self, competition_code: &str) -> Result<&[TeamAverages]> {
        tracing::debug!("Loading team averages for {}", competition_code);
        let teams = self.backend.fetch_team_averages(competition_code).await?;
        self.competition_code = Some(competition_code.to_string());
        self.teams = teams;
        Ok(&self.teams)
    }

    pub fn view(&self, metric: Metric, selected_teams: &[String]) -> Vec<&TeamAverages> {
        rank(&self.teams, metric, selected_teams)
    }
}

/// Highest value first. An empty selection keeps every team.
pub fn rank<'a>(
    teams: &'a [TeamAverages],
    metric: Metric,
    selected_teams: &[String],
) -> Vec<&'a TeamAverages> {
    let mut ranked: Vec<&TeamAverages> = teams
        .iter()
        .filter(|t| selected_teams.is_empty() || selected_teams.contains(&t.team_number))
        .collect();
    ranked.sort_by(|a, b| {
        b.value(metric)
            .partial_cmp(&a.value(metric))
            .unwrap_or(Ordering::Equal)
    });
    ranked
}
