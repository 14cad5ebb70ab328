use crate::core::{ParsedScan, Result, ScoutingBackend, SubmitResult};
use crate::domain::model::{Alliance, AllianceRoster, MatchKey};
use crate::utils::error::ScoutError;
use std::collections::HashSet;

/// Scanning state for one match: its roster and the teams confirmed so far.
///
/// A session only exists once its roster has loaded. Moving to another match
/// consumes the session through [`ScanSession::advance`]; the next match needs
/// a fresh [`ScanSession::initialize`].
#[derive(Debug, Clone)]
pub struct ScanSession {
    key: MatchKey,
    roster: AllianceRoster,
    scanned: HashSet<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamStatus {
    pub team_number: u32,
    pub alliance: Alliance,
    pub scanned: bool,
}

impl ScanSession {
    pub async fn initialize<B>(key: MatchKey, backend: &B) -> Result<Self>
    where
        B: ScoutingBackend + ?Sized,
    {
        tracing::debug!("Loading roster for match {}", key);

        let roster = backend
            .fetch_match_roster(&key.competition_code, key.match_number)
            .await
            .and_then(|teams| AllianceRoster::split(&teams))
            .map_err(|e| {
                tracing::warn!("Roster for match {} unavailable: {}", key, e);
                ScoutError::RosterUnavailable {
                    competition_code: key.competition_code.clone(),
                    match_number: key.match_number,
                    reason: e.to_string(),
                }
            })?;

        tracing::info!(
            "Scanning match {} (blue {:?}, red {:?})",
            key,
            roster.blue(),
            roster.red()
        );

        Ok(Self::with_roster(key, roster))
    }

    pub fn with_roster(key: MatchKey, roster: AllianceRoster) -> Self {
        Self {
            key,
            roster,
            scanned: HashSet::new(),
        }
    }

    /// Breaks a `"<match>","<team>"` token into its two raw fields.
    pub fn parse_input(raw: &str) -> Result<ParsedScan> {
        let token = raw.trim();
        let malformed = |reason: &str| ScoutError::MalformedInput {
            input: raw.to_string(),
            reason: reason.to_string(),
        };

        if token.is_empty() {
            return Err(malformed("input is empty"));
        }
        if !token.contains(',') {
            return Err(malformed("missing comma between match and team fields"));
        }

        let fields = token
            .split(',')
            .map(|field| unquote(field.trim()))
            .collect::<Option<Vec<&str>>>()
            .ok_or_else(|| malformed("every field must be wrapped in double quotes"))?;

        let [match_field, team_field] = fields.as_slice() else {
            return Err(malformed(&format!(
                "expected a match field and a team field, found {} fields",
                fields.len()
            )));
        };

        if match_field.is_empty() {
            return Err(malformed("match field is empty"));
        }
        if team_field.is_empty() {
            return Err(malformed("team field is empty"));
        }

        Ok(ParsedScan {
            match_field: match_field.to_string(),
            team_field: team_field.to_string(),
            token: token.to_string(),
        })
    }

    /// The match field is checked before the team field, so a scan for the
    /// wrong match is reported as such whatever its team value. The field
    /// must spell the match number exactly: `"012"` is not match 12.
    pub fn validate(&self, parsed: &ParsedScan) -> Result<()> {
        if parsed.match_field != self.key.match_number.to_string() {
            return Err(ScoutError::MatchMismatch {
                expected: self.key.match_number,
                found: parsed.match_field.clone(),
            });
        }

        if parsed.team_number().is_none() {
            return Err(ScoutError::InvalidTeamNumber {
                value: parsed.team_field.clone(),
            });
        }

        Ok(())
    }

    /// Validates and forwards a scan. Teams outside this match's roster are
    /// still submitted but never marked as scanned here.
    pub async fn submit<B>(&mut self, parsed: &ParsedScan, backend: &B) -> Result<SubmitResult>
    where
        B: ScoutingBackend + ?Sized,
    {
        self.validate(parsed)?;
        let team_number = parsed
            .team_number()
            .ok_or_else(|| ScoutError::InvalidTeamNumber {
                value: parsed.team_field.clone(),
            })?;

        tracing::debug!("Submitting scan {} for match {}", parsed.token, self.key);
        let message = backend
            .submit_scan(&self.key.competition_code, &parsed.token)
            .await
            .map_err(|e| {
                tracing::warn!("Scan for team {} not submitted: {}", team_number, e);
                ScoutError::SubmissionError {
                    reason: e.to_string(),
                }
            })?;

        if self.roster.contains(team_number) {
            if self.scanned.insert(team_number) {
                tracing::info!(
                    "Team {} scanned ({}/{})",
                    team_number,
                    self.scanned.len(),
                    self.roster.teams().count()
                );
            }
        } else {
            tracing::warn!("Team {} is not playing in match {}", team_number, self.key);
        }

        Ok(SubmitResult::from_backend_message(message))
    }

    pub fn is_scanned(&self, team_number: u32) -> bool {
        self.scanned.contains(&team_number)
    }

    pub fn scanned_count(&self) -> usize {
        self.scanned.len()
    }

    pub fn key(&self) -> &MatchKey {
        &self.key
    }

    pub fn roster(&self) -> &AllianceRoster {
        &self.roster
    }

    pub fn team_status(&self) -> Vec<TeamStatus> {
        [Alliance::Blue, Alliance::Red]
            .into_iter()
            .flat_map(|alliance| {
                self.roster
                    .alliance(alliance)
                    .iter()
                    .map(move |&team_number| (alliance, team_number))
            })
            .map(|(alliance, team_number)| TeamStatus {
                team_number,
                alliance,
                scanned: self.is_scanned(team_number),
            })
            .collect()
    }

    /// Ends this session and names the match to scan next. On error the
    /// session is handed back unchanged.
    pub fn advance(self) -> std::result::Result<MatchKey, (Self, ScoutError)> {
        match self.key.next() {
            Ok(next) => {
                tracing::info!("Leaving match {} for {}", self.key, next);
                Ok(next)
            }
            Err(e) => Err((self, e)),
        }
    }
}

fn unquote(field: &str) -> Option<&str> {
    let inner = field.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then_some(inner)
}
