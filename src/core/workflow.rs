use crate::core::scan_session::{ScanSession, TeamStatus};
use crate::core::{Result, ScoutingBackend, SubmitResult};
use crate::domain::model::MatchKey;
use crate::utils::error::ScoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Ready,
    Submitting,
    Failed,
    Advancing,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// The backend accepted the request; its reply may still be an error text.
    Submitted(SubmitResult),
    Rejected(ScoutError),
}

impl SubmitOutcome {
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Submitted(result) => result.message.clone(),
            SubmitOutcome::Rejected(err) => err.user_friendly_message(),
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            SubmitOutcome::Submitted(result) => result.is_error,
            SubmitOutcome::Rejected(_) => true,
        }
    }
}

/// Drives scan sessions for one scouter: loading a match, feeding it scans,
/// and moving on to the next match. Failures never end the workflow; they
/// become the status line and the user re-triggers the action.
pub struct ScanWorkflow<B: ScoutingBackend> {
    backend: B,
    phase: SessionPhase,
    current: Option<MatchKey>,
    session: Option<ScanSession>,
    status: Option<String>,
}

impl<B: ScoutingBackend> ScanWorkflow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            phase: SessionPhase::Uninitialized,
            current: None,
            session: None,
            status: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn session(&self) -> Option<&ScanSession> {
        self.session.as_ref()
    }

    pub fn current_match(&self) -> Option<&MatchKey> {
        self.current.as_ref()
    }

    pub fn team_status(&self) -> Vec<TeamStatus> {
        self.session
            .as_ref()
            .map(ScanSession::team_status)
            .unwrap_or_default()
    }

    /// Loads `key`, replacing whatever session was active.
    pub async fn start(&mut self, key: MatchKey) -> Result<()> {
        self.session = None;
        self.current = Some(key.clone());
        self.phase = SessionPhase::Loading;

        match ScanSession::initialize(key, &self.backend).await {
            Ok(session) => {
                self.session = Some(session);
                self.phase = SessionPhase::Ready;
                self.status = None;
                Ok(())
            }
            Err(e) => {
                self.phase = SessionPhase::Failed;
                self.status = Some(e.user_friendly_message());
                Err(e)
            }
        }
    }

    /// Re-runs the last failed load.
    pub async fn retry(&mut self) -> Result<()> {
        match (self.phase, self.current.clone()) {
            (SessionPhase::Failed, Some(key)) => self.start(key).await,
            (SessionPhase::Failed, None) | (SessionPhase::Uninitialized, _) => {
                Err(ScoutError::NoActiveMatch)
            }
            _ => Ok(()),
        }
    }

    pub async fn submit_input(&mut self, raw: &str) -> SubmitOutcome {
        let outcome = self.try_submit(raw).await;
        let outcome = match outcome {
            Ok(result) => SubmitOutcome::Submitted(result),
            Err(e) => {
                tracing::debug!("Scan rejected: {}", e);
                SubmitOutcome::Rejected(e)
            }
        };
        self.status = Some(outcome.message());
        outcome
    }

    async fn try_submit(&mut self, raw: &str) -> Result<SubmitResult> {
        // A dropped submission future can leave the phase at Submitting.
        if !matches!(self.phase, SessionPhase::Ready | SessionPhase::Submitting) {
            return Err(ScoutError::NoActiveMatch);
        }
        let session = self.session.as_mut().ok_or(ScoutError::NoActiveMatch)?;

        let parsed = ScanSession::parse_input(raw)?;
        session.validate(&parsed)?;

        self.phase = SessionPhase::Submitting;
        let result = session.submit(&parsed, &self.backend).await;
        self.phase = SessionPhase::Ready;
        result
    }

    /// Moves to the following match. Works from a failed load too, since the
    /// target only depends on the current match number.
    pub async fn next_match(&mut self) -> Result<MatchKey> {
        let next = match (self.session.take(), self.current.as_ref()) {
            (Some(session), _) => session.advance().map_err(|(session, e)| {
                self.session = Some(session);
                e
            }),
            (None, Some(current)) => current.next(),
            (None, None) => Err(ScoutError::NoActiveMatch),
        };
        let next = match next {
            Ok(next) => next,
            Err(e) => {
                self.status = Some(e.user_friendly_message());
                return Err(e);
            }
        };

        self.phase = SessionPhase::Advancing;
        self.start(next.clone()).await?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock_backend::MockBackend;

    fn backend() -> MockBackend {
        MockBackend::new()
            .with_match(7, &[1, 2, 3, 4, 5, 6], 0)
            .with_match(8, &[11, 12, 13, 14, 15, 16], 0)
    }

    #[tokio::test]
    async fn test_start_moves_to_ready() {
        let mut workflow = ScanWorkflow::new(backend());
        assert_eq!(workflow.phase(), SessionPhase::Uninitialized);

        workflow.start(MatchKey::new("2024mimus", 7)).await.unwrap();

        assert_eq!(workflow.phase(), SessionPhase::Ready);
        assert_eq!(workflow.team_status().len(), 6);
        assert!(workflow.status().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_can_be_retried() {
        let mut workflow = ScanWorkflow::new(backend());

        let err = workflow.start(MatchKey::new("2024mimus", 99)).await.unwrap_err();
        assert!(matches!(err, ScoutError::RosterUnavailable { .. }));
        assert_eq!(workflow.phase(), SessionPhase::Failed);
        assert!(workflow.session().is_none());
        assert_eq!(
            workflow.status(),
            Some("Error fetching match data for match 99")
        );

        assert!(workflow.retry().await.is_err());
        assert_eq!(workflow.phase(), SessionPhase::Failed);
    }

    #[tokio::test]
    async fn test_submit_before_start_is_rejected() {
        let backend = backend();
        let mut workflow = ScanWorkflow::new(backend.clone());

        let outcome = workflow.submit_input("\"7\",\"1\"").await;

        assert!(matches!(outcome, SubmitOutcome::Rejected(ScoutError::NoActiveMatch)));
        assert!(backend.submitted().await.is_empty());
    }

    #[tokio::test]
    async fn test_submit_returns_to_ready_after_each_attempt() {
        let backend = backend();
        let mut workflow = ScanWorkflow::new(backend.clone());
        workflow.start(MatchKey::new("2024mimus", 7)).await.unwrap();

        let ok = workflow.submit_input("\"7\",\"2\"").await;
        assert!(!ok.is_error());
        assert_eq!(workflow.phase(), SessionPhase::Ready);

        let mismatch = workflow.submit_input("\"8\",\"2\"").await;
        assert!(mismatch.is_error());
        assert_eq!(
            workflow.status(),
            Some("Invalid match number. Match number is 7")
        );
        assert_eq!(workflow.phase(), SessionPhase::Ready);

        let malformed = workflow.submit_input("7,2").await;
        assert_eq!(
            malformed.message(),
            "Invalid team data format. Please enter a valid input."
        );

        assert_eq!(backend.submitted().await.len(), 1);
        assert!(workflow.session().unwrap().is_scanned(2));
    }

    #[tokio::test]
    async fn test_submission_failure_is_reported_not_fatal() {
        let mut workflow = ScanWorkflow::new(backend().with_failing_submit());
        workflow.start(MatchKey::new("2024mimus", 7)).await.unwrap();

        let outcome = workflow.submit_input("\"7\",\"3\"").await;

        assert_eq!(outcome.message(), "Error adding team");
        assert_eq!(workflow.phase(), SessionPhase::Ready);
        assert!(!workflow.session().unwrap().is_scanned(3));
    }

    #[tokio::test]
    async fn test_next_match_discards_scanned_state() {
        let mut workflow = ScanWorkflow::new(backend());
        workflow.start(MatchKey::new("2024mimus", 7)).await.unwrap();
        workflow.submit_input("\"7\",\"1\"").await;

        let next = workflow.next_match().await.unwrap();

        assert_eq!(next, MatchKey::new("2024mimus", 8));
        assert_eq!(workflow.phase(), SessionPhase::Ready);
        let session = workflow.session().unwrap();
        assert_eq!(session.key().match_number, 8);
        assert_eq!(session.scanned_count(), 0);
        assert_eq!(session.roster().blue(), &[11, 12, 13]);
    }

    #[tokio::test]
    async fn test_next_match_from_failed_load() {
        let mut workflow = ScanWorkflow::new(backend());
        workflow.start(MatchKey::new("2024mimus", 6)).await.unwrap_err();

        let next = workflow.next_match().await.unwrap();

        assert_eq!(next.match_number, 7);
        assert_eq!(workflow.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn test_next_match_after_highest_number_keeps_session() {
        let backend = MockBackend::new().with_match(u32::MAX, &[1, 2, 3, 4, 5, 6], 0);
        let mut workflow = ScanWorkflow::new(backend);
        workflow.start(MatchKey::new("2024mimus", u32::MAX)).await.unwrap();
        workflow
            .submit_input(&format!("\"{}\",\"1\"", u32::MAX))
            .await;

        let err = workflow.next_match().await.unwrap_err();

        assert!(matches!(err, ScoutError::NoFollowingMatch { .. }));
        assert_eq!(workflow.phase(), SessionPhase::Ready);
        assert!(workflow.session().unwrap().is_scanned(1));
        assert_eq!(
            workflow.status(),
            Some(format!("Match {} is the last match", u32::MAX).as_str())
        );
    }

    #[tokio::test]
    async fn test_next_match_without_any_match() {
        let mut workflow = ScanWorkflow::new(backend());
        assert!(matches!(
            workflow.next_match().await,
            Err(ScoutError::NoActiveMatch)
        ));
        assert_eq!(workflow.status(), Some("No match selected"));
    }
}
