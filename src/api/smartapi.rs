use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use super::error::ApiError;
use super::window::CandleWindow;
use crate::candles::RawCandleRow;
use crate::models::{Interval, MarketIndex};

pub const SMARTAPI_BASE_URL: &str = "https://apiconnect.angelbroking.com";
const CANDLE_PATH: &str = "/rest/secure/angelbroking/historical/v1/getCandleData";
const SERVICE: &str = "SmartAPI";
const RATE_LIMIT_PER_SEC: u32 = 3; // Historical endpoint allows 3 requests/second
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

type SmartApiRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// What to fetch: index, bucket size and time range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleRequest {
    pub index: MarketIndex,
    pub interval: Interval,
    pub window: CandleWindow,
}

/// Supplier of raw candle rows
///
/// Implementations never fail: a network, auth or decoding problem yields an
/// empty row list, which the engine treats as "no data".
#[allow(async_fn_in_trait)]
pub trait CandleSource {
    async fn fetch_candles(&self, request: &CandleRequest) -> Vec<RawCandleRow>;

    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct CandlePayload<'a> {
    exchange: &'a str,
    symboltoken: &'a str,
    interval: &'a str,
    fromdate: String,
    todate: String,
}

#[derive(Debug, Deserialize)]
struct CandleResponse {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Historical candle client for Angel One SmartAPI
///
/// Takes an already-issued session token; logging in is someone else's job.
#[derive(Clone)]
pub struct SmartApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    jwt_token: String,
    rate_limiter: Arc<SmartApiRateLimiter>,
}

impl SmartApiClient {
    pub fn new(api_key: String, jwt_token: String) -> Self {
        Self::with_base_url(SMARTAPI_BASE_URL.to_string(), api_key, jwt_token)
    }

    pub fn with_base_url(base_url: String, api_key: String, jwt_token: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());

        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SEC).unwrap_or(NonZeroU32::MIN));

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            jwt_token,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Fetch raw rows, retrying rate limits and server errors with backoff
    pub async fn get_candle_data(&self, request: &CandleRequest) -> Result<Vec<RawCandleRow>, ApiError> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(request).await {
                Ok(rows) => return Ok(rows),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt - 1);
                    tracing::warn!(
                        "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                        attempt,
                        MAX_RETRIES,
                        request.index,
                        e,
                        backoff_ms
                    );
                    sleep(Duration::from_millis(backoff_ms)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, request: &CandleRequest) -> Result<Vec<RawCandleRow>, ApiError> {
        self.rate_limiter.until_ready().await;

        let payload = CandlePayload {
            exchange: request.index.exchange(),
            symboltoken: request.index.symbol_token(),
            interval: request.interval.as_api_str(),
            fromdate: request.window.from_param(),
            todate: request.window.to_param(),
        };

        let url = format!("{}{}", self.base_url, CANDLE_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.jwt_token)
            .header("X-PrivateKey", &self.api_key)
            .header("X-UserType", "USER")
            .header("X-SourceID", "WEB")
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let body: CandleResponse = response.json().await?;
        if body.status == Some(false) {
            return Err(ApiError::Rejected {
                service: SERVICE,
                message: body.message.unwrap_or_else(|| "no message".to_string()),
            });
        }

        Ok(rows_from_data(body.data))
    }
}

/// `data` must be a non-empty list of lists; anything else means no candles
fn rows_from_data(data: Option<Value>) -> Vec<RawCandleRow> {
    let Some(Value::Array(items)) = data else {
        return Vec::new();
    };

    if !matches!(items.first(), Some(Value::Array(_))) {
        return Vec::new();
    }

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Array(row) => Some(row),
            _ => None,
        })
        .collect()
}

impl CandleSource for SmartApiClient {
    async fn fetch_candles(&self, request: &CandleRequest) -> Vec<RawCandleRow> {
        match self.get_candle_data(request).await {
            Ok(rows) => {
                tracing::debug!(
                    "Fetched {} {} candles for {} ({} → {})",
                    rows.len(),
                    request.interval.label(),
                    request.index,
                    request.window.from_param(),
                    request.window.to_param()
                );
                rows
            }
            Err(e) => {
                tracing::warn!("Candle fetch for {} failed: {}", request.index, e);
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        SERVICE
    }
}
