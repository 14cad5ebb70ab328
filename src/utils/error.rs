use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Roster unavailable for match {match_number} of {competition_code}: {reason}")]
    RosterUnavailable {
        competition_code: String,
        match_number: u32,
        reason: String,
    },

    #[error("Schedule unavailable for {competition_code}: {reason}")]
    ScheduleUnavailable {
        competition_code: String,
        reason: String,
    },

    #[error("Malformed scan input '{input}': {reason}")]
    MalformedInput { input: String, reason: String },

    #[error("Scan is for match '{found}' but the active match is {expected}")]
    MatchMismatch { expected: u32, found: String },

    #[error("Invalid team number: '{value}'")]
    InvalidTeamNumber { value: String },

    #[error("Scan submission failed: {reason}")]
    SubmissionError { reason: String },

    #[error("No match selected")]
    NoActiveMatch,

    #[error("Match {match_number} has no following match")]
    NoFollowingMatch { match_number: u32 },

    #[error("Invalid alliance roster {teams:?}: {reason}")]
    InvalidRoster { teams: Vec<u32>, reason: String },

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unexpected backend response: {message}")]
    InvalidResponse { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Backend,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::MalformedInput { .. }
            | ScoutError::MatchMismatch { .. }
            | ScoutError::InvalidTeamNumber { .. }
            | ScoutError::NoActiveMatch
            | ScoutError::NoFollowingMatch { .. } => ErrorCategory::Input,
            ScoutError::RosterUnavailable { .. }
            | ScoutError::ScheduleUnavailable { .. }
            | ScoutError::SubmissionError { .. }
            | ScoutError::InvalidRoster { .. }
            | ScoutError::Http(_)
            | ScoutError::HttpStatus { .. }
            | ScoutError::InvalidResponse { .. }
            | ScoutError::Serialization(_) => ErrorCategory::Backend,
            ScoutError::ConfigError { .. } | ScoutError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            ScoutError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Backend => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Short status line suitable for showing next to the scan input.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ScoutError::MatchMismatch { expected, .. } => {
                format!("Invalid match number. Match number is {}", expected)
            }
            ScoutError::MalformedInput { .. } | ScoutError::InvalidTeamNumber { .. } => {
                "Invalid team data format. Please enter a valid input.".to_string()
            }
            ScoutError::SubmissionError { .. } => "Error adding team".to_string(),
            ScoutError::NoActiveMatch => "No match selected".to_string(),
            ScoutError::NoFollowingMatch { match_number } => {
                format!("Match {} is the last match", match_number)
            }
            ScoutError::RosterUnavailable { match_number, .. } => {
                format!("Error fetching match data for match {}", match_number)
            }
            ScoutError::ScheduleUnavailable { competition_code, .. } => {
                format!("Error fetching match data for {}", competition_code)
            }
            ScoutError::ConfigError { .. } | ScoutError::InvalidConfigValue { .. } => {
                format!("Configuration problem: {}", self)
            }
            other => format!("Error: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Re-scan the code and submit it again",
            ErrorCategory::Backend => "Check that the scouting backend is reachable and retry",
            ErrorCategory::Configuration => "Fix the configuration file or command-line flags",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
