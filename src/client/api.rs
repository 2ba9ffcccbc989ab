//! Legacy REST client for the single-table endpoints
//!
//! Parallel to the room socket and not used by the session. Each call is a
//! JSON `POST` under the configured base URL.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::protocol::{Dice, DiceMask};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP status
    #[error("{operation} failed with status {status}")]
    Status {
        operation: &'static str,
        status: u16,
    },
    #[error("{operation} request failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} response could not be decoded: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RollRequest {
    reroll_dice: DiceMask,
}

#[derive(Debug, Deserialize)]
struct RollResponse {
    dice: Dice,
}

#[derive(Debug, Deserialize)]
struct EvaluationName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    evaluation: EvaluationName,
}

pub struct LegacyApiClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl LegacyApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Http {
                operation: "client init",
                source,
            })?;
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn post<B, T>(
        &self,
        operation: &'static str,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "[API] POST");

        let mut request = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .map_err(|source| ApiError::Http { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "[API] {} failed", operation);
            return Err(ApiError::Status {
                operation,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .map_err(|source| ApiError::Decode { operation, source })
    }

    /// Roll the dice flagged in `reroll_dice`, returning the new faces
    pub fn roll(&self, reroll_dice: DiceMask) -> Result<Dice, ApiError> {
        let response: RollResponse =
            self.post("roll dice", "roll", Some(&RollRequest { reroll_dice }))?;
        Ok(response.dice)
    }

    /// Name of the current hand
    pub fn evaluate(&self) -> Result<String, ApiError> {
        let response: EvaluateResponse = self.post::<(), _>("evaluate dice", "evaluate", None)?;
        Ok(response.evaluation.name)
    }

    pub fn next_turn(&self) -> Result<serde_json::Value, ApiError> {
        self.post::<(), _>("next turn", "next-turn", None)
    }

    pub fn new_game(&self) -> Result<serde_json::Value, ApiError> {
        self.post::<(), _>("new game", "new-game", None)
    }
}
