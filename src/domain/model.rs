use crate::utils::error::{Result, ScoutError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Teams per alliance in a qualification match.
pub const ALLIANCE_SIZE: usize = 3;

/// A match is flagged complete once this many teams have been scanned.
pub const COMPLETENESS_THRESHOLD: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub competition_code: String,
    pub match_number: u32,
}

impl MatchKey {
    pub fn new(competition_code: impl Into<String>, match_number: u32) -> Self {
        Self {
            competition_code: competition_code.into(),
            match_number,
        }
    }

    /// The following match in the same competition.
    pub fn next(&self) -> Result<MatchKey> {
        let match_number = self
            .match_number
            .checked_add(1)
            .ok_or(ScoutError::NoFollowingMatch {
                match_number: self.match_number,
            })?;
        Ok(MatchKey {
            competition_code: self.competition_code.clone(),
            match_number,
        })
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.competition_code, self.match_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    Blue,
    Red,
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alliance::Blue => write!(f, "Blue Alliance"),
            Alliance::Red => write!(f, "Red Alliance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceRoster {
    blue: Vec<u32>,
    red: Vec<u32>,
}

impl AllianceRoster {
    /// Splits the six-team listing the schedule returns: positions 0-2 are
    /// the blue alliance and 3-5 the red one, for every caller.
    pub fn split(raw: &[u32]) -> Result<Self> {
        let invalid = |reason: &str| ScoutError::InvalidRoster {
            teams: raw.to_vec(),
            reason: reason.to_string(),
        };

        if raw.len() != ALLIANCE_SIZE * 2 {
            return Err(invalid(&format!(
                "expected {} team numbers, got {}",
                ALLIANCE_SIZE * 2,
                raw.len()
            )));
        }
        if raw.contains(&0) {
            return Err(invalid("team numbers must be positive"));
        }

        let (blue, red) = raw.split_at(ALLIANCE_SIZE);
        if blue.iter().any(|team| red.contains(team)) {
            return Err(invalid("a team cannot play on both alliances"));
        }

        Ok(Self {
            blue: blue.to_vec(),
            red: red.to_vec(),
        })
    }

    pub fn blue(&self) -> &[u32] {
        &self.blue
    }

    pub fn red(&self) -> &[u32] {
        &self.red
    }

    pub fn alliance(&self, alliance: Alliance) -> &[u32] {
        match alliance {
            Alliance::Blue => &self.blue,
            Alliance::Red => &self.red,
        }
    }

    pub fn alliance_of(&self, team_number: u32) -> Option<Alliance> {
        if self.blue.contains(&team_number) {
            Some(Alliance::Blue)
        } else if self.red.contains(&team_number) {
            Some(Alliance::Red)
        } else {
            None
        }
    }

    pub fn contains(&self, team_number: u32) -> bool {
        self.alliance_of(team_number).is_some()
    }

    /// Blue teams first, then red.
    pub fn teams(&self) -> impl Iterator<Item = u32> + '_ {
        self.blue.iter().chain(self.red.iter()).copied()
    }
}

/// A scan token broken into its two quoted fields. The fields are kept raw;
/// numeric checks happen during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScan {
    pub match_field: String,
    pub team_field: String,
    pub token: String,
}

impl ParsedScan {
    pub fn team_number(&self) -> Option<u32> {
        self.team_field.parse::<u32>().ok().filter(|n| *n > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitResult {
    pub message: String,
    pub is_error: bool,
}

impl SubmitResult {
    pub fn from_backend_message(message: String) -> Self {
        let is_error = message.contains("Error");
        Self { message, is_error }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub key: MatchKey,
    pub roster: AllianceRoster,
    pub scanned_count: u32,
    /// Set only when the aggregator isolates per-match failures.
    pub count_error: Option<String>,
}

impl MatchSummary {
    pub fn is_complete(&self) -> bool {
        self.scanned_count >= COMPLETENESS_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMatch {
    #[serde(rename = "matchNumber")]
    pub match_number: u32,
}

/// One stored scouting record as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    #[serde(rename = "match")]
    pub match_info: RecordMatch,
    pub team_number: u32,
    #[serde(default)]
    pub scouter_name: String,
    #[serde(default)]
    pub starting_position: i64,
    #[serde(default)]
    pub passed_starting_line: i64,
    #[serde(default)]
    pub scored_first_shot: i64,
    #[serde(default)]
    pub auto_close_notes_scored: i64,
    #[serde(default)]
    pub auto_far_notes_scored: i64,
    #[serde(default)]
    pub teleop_speaker_notes: i64,
    #[serde(default)]
    pub teleop_amp_notes: i64,
    #[serde(default)]
    pub teleop_notes_fed: i64,
    #[serde(default)]
    pub defense_rating: i64,
    #[serde(default)]
    pub mechanical_failure: i64,
    #[serde(default)]
    pub end_location: i64,
    #[serde(default)]
    pub scored_trap_note: i64,
    #[serde(default)]
    pub comments: String,
}

impl ScanRecord {
    pub fn match_number(&self) -> u32 {
        self.match_info.match_number
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    AutoCloseNotes,
    AutoFarNotes,
    SpeakerNotes,
    AmpNotes,
    NotesFed,
    DefenseRating,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::AutoCloseNotes,
        Metric::AutoFarNotes,
        Metric::SpeakerNotes,
        Metric::AmpNotes,
        Metric::NotesFed,
        Metric::DefenseRating,
    ];

    /// Position of this metric in the backend's averages array.
    pub fn index(self) -> usize {
        match self {
            Metric::AutoCloseNotes => 0,
            Metric::AutoFarNotes => 1,
            Metric::SpeakerNotes => 2,
            Metric::AmpNotes => 3,
            Metric::NotesFed => 4,
            Metric::DefenseRating => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::AutoCloseNotes => "Auto Close Notes",
            Metric::AutoFarNotes => "Auto Far Notes",
            Metric::SpeakerNotes => "Speaker Notes",
            Metric::AmpNotes => "Amp Notes",
            Metric::NotesFed => "Notes Fed",
            Metric::DefenseRating => "Defense Rating",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAverages {
    pub team_number: String,
    pub values: [f64; 6],
}

impl TeamAverages {
    pub fn value(&self, metric: Metric) -> f64 {
        self.values[metric.index()]
    }
}
