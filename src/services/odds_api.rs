//! Read-only client of the sports odds provider (BetsAPI v3)
//!
//! Responses are validated into typed records at this boundary. Every
//! failure degrades to an empty result or the static sports list.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::configure::OddsApiConfig;

const PLACEHOLDER_TOKENS: [&str; 2] = ["YOUR_TOKEN", "YOUR_TOKEN_HERE"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct League {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportEvent {
    pub id: String,
    pub sport_id: String,
    pub time: String,
    pub time_status: String,
    pub league: League,
    pub home: Team,
    pub away: Team,
    /// Current score, e.g. `1-0`
    #[serde(default)]
    pub ss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    success: i64,
    results: T,
}

/// Sports always offered, even when the provider is down
pub fn static_sports() -> Vec<Sport> {
    [
        ("1", "Soccer"),
        ("2", "Tennis"),
        ("18", "Basketball"),
        ("4", "Cricket"),
        ("7522", "Horse Racing"),
        ("61420", "Esports"),
    ]
    .into_iter()
    .map(|(id, title)| Sport { id: id.to_string(), title: title.to_string() })
    .collect()
}

/// Static list first, then provider sports with unseen ids
pub fn merge_sports(provider: Vec<Sport>) -> Vec<Sport> {
    let mut sports = static_sports();
    let mut seen: HashSet<String> = sports.iter().map(|s| s.id.clone()).collect();
    for sport in provider {
        if seen.insert(sport.id.clone()) {
            sports.push(sport);
        }
    }
    sports
}

/// Unique leagues in first-seen order
pub fn unique_leagues(events: &[SportEvent]) -> Vec<League> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| seen.insert(e.league.id.clone()))
        .map(|e| e.league.clone())
        .collect()
}

/// Validate a `{success, results}` envelope into typed results
pub fn parse_results<T: DeserializeOwned>(body: Value) -> Result<T> {
    let envelope: ResultsEnvelope<T> =
        serde_json::from_value(body).context("unexpected odds provider response")?;
    if envelope.success == 0 {
        bail!("odds provider reported failure");
    }
    Ok(envelope.results)
}

fn first_result(body: Value) -> Option<Value> {
    match parse_results::<Vec<Value>>(body) {
        Ok(results) => results.into_iter().next(),
        Err(_) => None,
    }
}

pub struct OddsClient {
    client: Client,
    base_url: String,
    token: String,
}

impl OddsClient {
    pub fn new(config: &OddsApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !PLACEHOLDER_TOKENS.contains(&self.token.as_str())
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        if !self.is_configured() {
            bail!("odds API token not configured");
        }

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&[("token", self.token.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("request to {} failed", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let reason = body["message"].as_str().unwrap_or(status.as_str()).to_string();
            bail!("{} returned {}: {}", endpoint, status, reason);
        }

        Ok(response.json().await?)
    }

    async fn events(&self, endpoint: &str, sport_id: &str) -> Vec<SportEvent> {
        let result = async {
            let body = self.fetch(endpoint, &[("sport_id", sport_id)]).await?;
            parse_results::<Vec<SportEvent>>(body)
        }
        .await;

        result.unwrap_or_else(|e| {
            log::error!("odds provider {} for sport {}: {:#}", endpoint, sport_id, e);
            Vec::new()
        })
    }

    pub async fn sports(&self) -> Vec<Sport> {
        let result = async { parse_results::<Vec<Sport>>(self.fetch("betfair/sports", &[]).await?) }.await;
        match result {
            Ok(provider) => merge_sports(provider),
            Err(e) => {
                log::warn!("falling back to static sports list: {:#}", e);
                static_sports()
            }
        }
    }

    pub async fn upcoming_events(&self, sport_id: &str) -> Vec<SportEvent> {
        self.events("betfair/ex/upcoming", sport_id).await
    }

    pub async fn inplay_events(&self, sport_id: &str) -> Vec<SportEvent> {
        self.events("betfair/ex/inplay", sport_id).await
    }

    /// Full event with markets, as returned by the provider
    pub async fn event(&self, event_id: &str) -> Option<Value> {
        match self.fetch("betfair/ex/event", &[("event_id", event_id)]).await {
            Ok(body) => first_result(body),
            Err(e) => {
                log::error!("odds provider event {}: {:#}", event_id, e);
                None
            }
        }
    }

    pub async fn event_result(&self, event_id: &str) -> Option<Value> {
        match self.fetch("betfair/result", &[("event_id", event_id)]).await {
            Ok(body) => first_result(body),
            Err(e) => {
                log::error!("odds provider result {}: {:#}", event_id, e);
                None
            }
        }
    }

    pub async fn odds_summary(&self, event_id: &str) -> Map<String, Value> {
        let result = async {
            parse_results::<Map<String, Value>>(
                self.fetch("events/odds/summary", &[("event_id", event_id)]).await?,
            )
        }
        .await;

        result.unwrap_or_else(|e| {
            log::error!("odds provider summary {}: {:#}", event_id, e);
            Map::new()
        })
    }

    pub async fn leagues_for_sport(&self, sport_id: &str) -> Vec<League> {
        unique_leagues(&self.upcoming_events(sport_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_json(id: &str, league_id: &str, league: &str) -> Value {
        json!({
            "id": id,
            "sport_id": "1",
            "time": "1760000000",
            "time_status": "0",
            "league": {"id": league_id, "name": league},
            "home": {"id": "10", "name": "Home FC"},
            "away": {"id": "11", "name": "Away FC"},
            "ss": null
        })
    }

    #[test]
    fn test_merge_sports_keeps_static_first() {
        let merged = merge_sports(vec![
            Sport { id: "1".to_string(), title: "Football".to_string() },
            Sport { id: "3".to_string(), title: "Cricket Exchange".to_string() },
        ]);
        assert_eq!(merged.len(), 7);
        assert_eq!(merged[0].title, "Soccer");
        assert_eq!(merged[6].id, "3");
    }

    #[test]
    fn test_parse_events() {
        let body = json!({"success": 1, "results": [event_json("e1", "100", "Premier League")]});
        let events: Vec<SportEvent> = parse_results(body).unwrap();
        assert_eq!(events[0].home.name, "Home FC");
        assert_eq!(events[0].ss, None);
    }

    #[test]
    fn test_invalid_payloads_are_rejected() {
        let missing_league = json!({"success": 1, "results": [{"id": "e1"}]});
        assert!(parse_results::<Vec<SportEvent>>(missing_league).is_err());

        let failed = json!({"success": 0, "results": []});
        assert!(parse_results::<Vec<SportEvent>>(failed).is_err());
    }

    #[test]
    fn test_unique_leagues_first_seen_order() {
        let body = json!({"success": 1, "results": [
            event_json("e1", "200", "La Liga"),
            event_json("e2", "100", "Premier League"),
            event_json("e3", "200", "La Liga"),
        ]});
        let events: Vec<SportEvent> = parse_results(body).unwrap();
        let leagues = unique_leagues(&events);
        assert_eq!(leagues.len(), 2);
        assert_eq!(leagues[0].name, "La Liga");
        assert_eq!(leagues[1].id, "100");
    }

    #[test]
    fn test_first_result() {
        assert_eq!(first_result(json!({"success": 1, "results": [{"id": "e1"}]})), Some(json!({"id": "e1"})));
        assert_eq!(first_result(json!({"success": 1, "results": []})), None);
    }

    #[tokio::test]
    async fn test_unconfigured_token_degrades() {
        let client = OddsClient::new(&OddsApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            token: "YOUR_TOKEN".to_string(),
            timeout_ms: 100,
        })
        .unwrap();

        assert!(!client.is_configured());
        assert_eq!(client.sports().await, static_sports());
        assert!(client.upcoming_events("1").await.is_empty());
        assert!(client.event("e1").await.is_none());
        assert!(client.odds_summary("e1").await.is_empty());
    }
}
