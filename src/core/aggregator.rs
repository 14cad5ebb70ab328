use crate::core::{MatchSummary, Result, ScoutingBackend};
use crate::domain::model::{AllianceRoster, MatchKey};
use crate::utils::error::ScoutError;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_CONCURRENT_REQUESTS: usize = 8;

/// What a failed per-match scan count does to the whole load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failed count fails the load.
    #[default]
    FailFast,
    /// A failed count is kept on its summary; the rest of the load succeeds.
    Isolate,
}

/// Builds the per-match overview of a competition: roster plus how many
/// teams have been scanned.
pub struct MatchRosterAggregator<B: ScoutingBackend> {
    backend: B,
    policy: FailurePolicy,
    concurrent_requests: usize,
}

impl<B: ScoutingBackend> MatchRosterAggregator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            policy: FailurePolicy::default(),
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_concurrency(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests.max(1);
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Summaries come back in schedule order, whatever order the count
    /// requests finish in.
    pub async fn load(&self, competition_code: &str) -> Result<Vec<MatchSummary>> {
        let unavailable = |reason: String| ScoutError::ScheduleUnavailable {
            competition_code: competition_code.to_string(),
            reason,
        };

        tracing::debug!("Loading schedule for {}", competition_code);
        let schedule = self
            .backend
            .fetch_all_match_rosters(competition_code)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let matches = schedule
            .into_iter()
            .map(|(match_number, teams)| {
                AllianceRoster::split(&teams).map(|roster| (match_number, roster))
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| unavailable(e.to_string()))?;

        let mut seen = HashSet::with_capacity(matches.len());
        if let Some((duplicate, _)) = matches.iter().find(|(n, _)| !seen.insert(*n)) {
            return Err(unavailable(format!(
                "match {} is listed more than once",
                duplicate
            )));
        }

        tracing::debug!(
            "Fetching scan counts for {} matches ({} at a time)",
            matches.len(),
            self.concurrent_requests
        );

        let mut counts = self
            .fetch_counts(competition_code, matches.iter().map(|(n, _)| *n))
            .await
            .map_err(|(match_number, e)| {
                tracing::warn!("Scan count for match {} failed: {}", match_number, e);
                unavailable(format!("scan count for match {}: {}", match_number, e))
            })?;

        let summaries: Vec<MatchSummary> = matches
            .into_iter()
            .map(|(match_number, roster)| {
                let (scanned_count, count_error) = match counts.remove(&match_number) {
                    Some(Ok(count)) => (count, None),
                    Some(Err(e)) => (0, Some(e.to_string())),
                    None => (0, Some("scan count missing".to_string())),
                };
                MatchSummary {
                    key: MatchKey::new(competition_code, match_number),
                    roster,
                    scanned_count,
                    count_error,
                }
            })
            .collect();

        tracing::info!(
            "Loaded {} matches for {} ({} complete)",
            summaries.len(),
            competition_code,
            summaries.iter().filter(|s| s.is_complete()).count()
        );

        Ok(summaries)
    }

    /// Counts keyed by match number. Under [`FailurePolicy::FailFast`] the
    /// first failure ends the fetch.
    async fn fetch_counts(
        &self,
        competition_code: &str,
        match_numbers: impl Iterator<Item = u32>,
    ) -> std::result::Result<HashMap<u32, Result<u32>>, (u32, ScoutError)> {
        let backend = &self.backend;
        let requests = stream::iter(match_numbers).map(move |match_number| async move {
            let count = backend.fetch_scanned_count(competition_code, match_number).await;
            (match_number, count)
        });
        let responses = requests.buffer_unordered(self.concurrent_requests);

        match self.policy {
            FailurePolicy::FailFast => {
                let counts: HashMap<u32, u32> = responses
                    .map(|(match_number, count)| {
                        count
                            .map(|c| (match_number, c))
                            .map_err(|e| (match_number, e))
                    })
                    .try_collect()
                    .await?;
                Ok(counts.into_iter().map(|(n, c)| (n, Ok(c))).collect())
            }
            FailurePolicy::Isolate => Ok(responses.collect().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock_backend::MockBackend;

    fn three_matches() -> MockBackend {
        MockBackend::new()
            .with_match(1, &[100, 200, 300, 400, 500, 600], 6)
            .with_match(2, &[101, 201, 301, 401, 501, 601], 3)
            .with_match(3, &[102, 202, 302, 402, 502, 602], 0)
    }

    #[tokio::test]
    async fn test_load_marks_only_full_matches_complete() {
        let aggregator = MatchRosterAggregator::new(three_matches());

        let summaries = aggregator.load("2024mimus").await.unwrap();

        assert_eq!(summaries.len(), 3);
        assert_eq!(
            summaries.iter().map(|s| s.scanned_count).collect::<Vec<_>>(),
            vec![6, 3, 0]
        );
        assert_eq!(
            summaries.iter().map(|s| s.is_complete()).collect::<Vec<_>>(),
            vec![true, false, false]
        );
        assert_eq!(summaries[0].key, MatchKey::new("2024mimus", 1));
        assert_eq!(summaries[0].roster.blue(), &[100, 200, 300]);
        assert_eq!(summaries[0].roster.red(), &[400, 500, 600]);
    }

    #[tokio::test]
    async fn test_load_keeps_schedule_order() {
        let backend = MockBackend::new()
            .with_match(10, &[1, 2, 3, 4, 5, 6], 1)
            .with_match(2, &[7, 8, 9, 10, 11, 12], 2)
            .with_match(5, &[13, 14, 15, 16, 17, 18], 3);
        let aggregator = MatchRosterAggregator::new(backend.clone()).with_concurrency(3);

        let summaries = aggregator.load("2024mimus").await.unwrap();

        assert_eq!(
            summaries.iter().map(|s| s.key.match_number).collect::<Vec<_>>(),
            vec![10, 2, 5]
        );
        assert_eq!(
            summaries.iter().map(|s| s.scanned_count).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let mut requested = backend.count_requests().await;
        requested.sort();
        assert_eq!(requested, vec![2, 5, 10]);
    }

    #[tokio::test]
    async fn test_schedule_failure_fails_load() {
        let aggregator = MatchRosterAggregator::new(three_matches().with_failing_rosters());

        let err = aggregator.load("2024mimus").await.unwrap_err();

        assert!(matches!(err, ScoutError::ScheduleUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_invalid_roster_fails_load() {
        let backend = three_matches().with_match(4, &[1, 2, 3], 0);
        let aggregator = MatchRosterAggregator::new(backend);

        let err = aggregator.load("2024mimus").await.unwrap_err();

        assert!(matches!(err, ScoutError::ScheduleUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_fail_fast_count_failure_fails_load() {
        let aggregator = MatchRosterAggregator::new(three_matches().with_failing_count(2));

        let err = aggregator.load("2024mimus").await.unwrap_err();

        match err {
            ScoutError::ScheduleUnavailable { reason, .. } => {
                assert!(reason.contains("match 2"), "reason was {}", reason)
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_isolate_keeps_other_matches() {
        let aggregator = MatchRosterAggregator::new(three_matches().with_failing_count(2))
            .with_policy(FailurePolicy::Isolate);

        let summaries = aggregator.load("2024mimus").await.unwrap();

        assert_eq!(summaries.len(), 3);
        assert!(summaries[0].is_complete());
        assert_eq!(summaries[1].scanned_count, 0);
        assert!(summaries[1].count_error.is_some());
        assert!(summaries[2].count_error.is_none());
    }

    #[tokio::test]
    async fn test_repeated_match_number_fails_load() {
        let backend = three_matches().with_match(1, &[103, 203, 303, 403, 503, 603], 6);

        for policy in [FailurePolicy::FailFast, FailurePolicy::Isolate] {
            let aggregator = MatchRosterAggregator::new(backend.clone()).with_policy(policy);
            match aggregator.load("2024mimus").await.unwrap_err() {
                ScoutError::ScheduleUnavailable { reason, .. } => {
                    assert!(reason.contains("match 1"), "reason was {}", reason)
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
        assert!(backend.count_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_schedule() {
        let aggregator = MatchRosterAggregator::new(MockBackend::new());
        assert!(aggregator.load("2024mimus").await.unwrap().is_empty());
    }
}
