use crate::domain::model::{ScanRecord, TeamAverages};
use crate::domain::ports::{ConfigProvider, ScoutingBackend};
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    body: T,
}

/// A JSON object read as key/value pairs in document order.
struct OrderedEntries<V>(Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// REST client for the scouting backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBackend {
    pub fn new(config: &impl ConfigProvider) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_seconds()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one so a
    /// competition code can never reach another endpoint.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let invalid_base = |reason: String| ScoutError::ConfigError {
            message: format!("backend URL '{}' {}", self.base_url, reason),
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid_base(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid_base("cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        tracing::debug!("Making API request to: {}", url);
        let response = request.timeout(self.timeout).send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(ScoutError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ScoutingBackend for HttpBackend {
    async fn fetch_match_roster(&self, competition_code: &str, match_number: u32) -> Result<Vec<u32>> {
        let envelope: Envelope<Vec<u32>> = self
            .get_json(&[
                "matches",
                competition_code,
                match_number.to_string().as_str(),
            ])
            .await?;
        Ok(envelope.body)
    }

    async fn fetch_all_match_rosters(&self, competition_code: &str) -> Result<Vec<(u32, Vec<u32>)>> {
        let envelope: Envelope<OrderedEntries<Vec<u32>>> = self
            .get_json(&["matches", competition_code])
            .await?;

        let mut seen = HashSet::new();
        envelope
            .body
            .0
            .into_iter()
            .map(|(key, teams)| -> Result<(u32, Vec<u32>)> {
                let match_number = key
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| ScoutError::InvalidResponse {
                        message: format!("schedule key '{}' is not a match number", key),
                    })?;
                if !seen.insert(match_number) {
                    return Err(ScoutError::InvalidResponse {
                        message: format!("schedule lists match {} more than once", match_number),
                    });
                }
                Ok((match_number, teams))
            })
            .collect()
    }

    async fn fetch_scanned_count(&self, competition_code: &str, match_number: u32) -> Result<u32> {
        self.get_json(&[
            "impi",
            "getNumberScanned",
            competition_code,
            match_number.to_string().as_str(),
        ])
        .await
    }

    async fn submit_scan(&self, competition_code: &str, token: &str) -> Result<String> {
        let url = self.endpoint(&["impi", competition_code, "add"])?;
        // The backend expects the scanned text wrapped in one more pair of quotes.
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(format!("\"{}\"", token));

        let response = self.send(request, &url).await?;
        Ok(response.text().await?)
    }

    async fn delete_scan_record(
        &self,
        competition_code: &str,
        team_number: u32,
        match_number: u32,
    ) -> Result<()> {
        let url = self.endpoint(&[
            "impi",
            competition_code,
            team_number.to_string().as_str(),
            match_number.to_string().as_str(),
        ])?;
        self.send(self.client.delete(url.clone()), &url).await?;
        Ok(())
    }

    async fn fetch_match_records(
        &self,
        competition_code: &str,
        match_number: u32,
    ) -> Result<Vec<ScanRecord>> {
        self.get_json(&[
            "impi",
            "match",
            competition_code,
            match_number.to_string().as_str(),
        ])
        .await
    }

    async fn fetch_team_averages(&self, competition_code: &str) -> Result<Vec<TeamAverages>> {
        let entries: OrderedEntries<Vec<f64>> = self
            .get_json(&["impi", "getAvgData", competition_code])
            .await?;

        entries
            .0
            .into_iter()
            .map(|(team_number, values)| -> Result<TeamAverages> {
                let values: [f64; 6] =
                    values
                        .try_into()
                        .map_err(|values: Vec<f64>| ScoutError::InvalidResponse {
                            message: format!(
                                "team {} has {} averages, expected 6",
                                team_number,
                                values.len()
                            ),
                        })?;
                Ok(TeamAverages {
                    team_number,
                    values,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_entries_keep_document_order() {
        let entries: OrderedEntries<Vec<u32>> =
            serde_json::from_str(r#"{"10": [1], "2": [2], "7": [3]}"#).unwrap();
        let keys: Vec<&str> = entries.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["10", "2", "7"]);
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let mut config = crate::ScoutConfig::default();
        config.backend.base_url = "http://scouting.local:8080/api/".to_string();
        let backend = HttpBackend::new(&config);

        let url = backend.endpoint(&["matches", "2024mimus/12", "x?y"]).unwrap();

        assert_eq!(
            url.as_str(),
            "http://scouting.local:8080/api/matches/2024mimus%2F12/x%3Fy"
        );
    }

    #[test]
    fn test_endpoint_rejects_unusable_base_url() {
        let mut config = crate::ScoutConfig::default();
        config.backend.base_url = "not a url".to_string();
        let backend = HttpBackend::new(&config);

        assert!(matches!(
            backend.endpoint(&["matches"]),
            Err(ScoutError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_ordered_entries_reject_non_object() {
        assert!(serde_json::from_str::<OrderedEntries<u32>>("[1, 2]").is_err());
    }
}
