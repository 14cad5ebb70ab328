use crate::config::toml_config::ScoutConfig;
use crate::core::aggregator::FailurePolicy;
use crate::domain::model::Metric;
use crate::utils::error::Result;
use crate::utils::validation;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "scout-scan")]
#[command(about = "Scan and review competition scouting records")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the backend base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Override how many scan-count requests run at once
    #[arg(long)]
    pub concurrent_requests: Option<usize>,

    /// Keep loading matches whose scan count could not be fetched
    #[arg(long)]
    pub isolate_failures: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines on stderr")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every match of a competition with its scan progress
    Matches { competition: String },
    /// Scan teams for a match, reading one token per line from stdin
    Scan { competition: String, match_number: u32 },
    /// List the stored records of a match
    Records { competition: String, match_number: u32 },
    /// Delete one stored record
    Remove {
        competition: String,
        team_number: u32,
        match_number: u32,
    },
    /// Rank teams by one of their server-computed averages
    Dashboard {
        /// Defaults to the configured competition
        competition: Option<String>,
        #[arg(long, value_enum, default_value = "auto-close-notes")]
        metric: MetricArg,
        /// Only show these teams
        #[arg(long, value_delimiter = ',')]
        teams: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    AutoCloseNotes,
    AutoFarNotes,
    SpeakerNotes,
    AmpNotes,
    NotesFed,
    DefenseRating,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::AutoCloseNotes => Metric::AutoCloseNotes,
            MetricArg::AutoFarNotes => Metric::AutoFarNotes,
            MetricArg::SpeakerNotes => Metric::SpeakerNotes,
            MetricArg::AmpNotes => Metric::AmpNotes,
            MetricArg::NotesFed => Metric::NotesFed,
            MetricArg::DefenseRating => Metric::DefenseRating,
        }
    }
}

impl Command {
    /// The competition named on the command line, if any. The dashboard
    /// falls back to the configured one when this is `None`.
    pub fn competition(&self) -> Option<&str> {
        match self {
            Command::Matches { competition }
            | Command::Scan { competition, .. }
            | Command::Records { competition, .. }
            | Command::Remove { competition, .. } => Some(competition.as_str()),
            Command::Dashboard { competition, .. } => competition.as_deref(),
        }
    }

    /// Rejects competition codes that could not be sent as one URL segment.
    pub fn validate_competition(&self) -> Result<()> {
        match self.competition() {
            Some(code) => validation::validate_competition_code("competition", code),
            None => Ok(()),
        }
    }
}

impl CliConfig {
    /// Command-line flags win over the file.
    pub fn apply_overrides(&self, config: &mut ScoutConfig) {
        if let Some(base_url) = &self.base_url {
            config.backend.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.backend.request_timeout_seconds = timeout;
        }
        if let Some(concurrent) = self.concurrent_requests {
            config.aggregator.concurrent_requests = concurrent;
        }
        if self.isolate_failures {
            config.aggregator.failure_policy = FailurePolicy::Isolate;
        }
    }
}
