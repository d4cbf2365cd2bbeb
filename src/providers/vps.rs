use crate::core::config::UpstreamConfig;
use crate::core::error::RateError;
use crate::core::rate::{PairKey, Quote};
use crate::core::source::QuoteSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

pub const VPS_SOURCE: &str = "VPS";

/// Quote client for the VPS quote API (`GET /api/quote?from=..&to=..`).
pub struct VpsQuoteSource {
    base_url: String,
    network: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl VpsQuoteSource {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ratecache/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(VpsQuoteSource {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            network: config.network.to_uppercase(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn quote_url(&self, pair: &PairKey) -> Result<Url, RateError> {
        Url::parse_with_params(
            &format!("{}/api/quote", self.base_url),
            &[
                ("from", pair.from_denom.as_str()),
                ("to", pair.to_denom.as_str()),
            ],
        )
        .map_err(|e| RateError::UpstreamUnavailable(format!("bad quote URL: {e}")))
    }
}

// `rate` is kept as a raw value so that strings, nulls and missing fields are
// told apart from a numeric rate instead of failing the whole body.
#[derive(Debug, Deserialize)]
struct QuoteBody {
    #[serde(default)]
    rate: Value,
    #[serde(default)]
    path: Option<Vec<String>>,
    #[serde(default)]
    liquidity: Option<f64>,
}

fn parse_quote(text: &str, pair: &PairKey) -> Result<Quote, RateError> {
    let body: QuoteBody = serde_json::from_str(text).map_err(|e| {
        RateError::InvalidUpstreamResponse(format!("failed to parse quote for {pair}: {e}"))
    })?;

    let rate = match &body.rate {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| {
        RateError::InvalidUpstreamResponse(format!(
            "rate for {pair} is not a number: {}",
            body.rate
        ))
    })?;

    let quote = Quote {
        rate,
        path: body.path,
        liquidity: body.liquidity,
    };
    quote.validate()?;
    Ok(quote)
}

#[async_trait]
impl QuoteSource for VpsQuoteSource {
    fn name(&self) -> &str {
        VPS_SOURCE
    }

    #[instrument(name = "VpsQuoteFetch", skip(self), fields(pair = %pair))]
    async fn fetch_quote(&self, pair: &PairKey) -> Result<Quote, RateError> {
        let url = self.quote_url(pair)?;
        debug!("Requesting quote from {}", url);

        let mut request = self.client.get(url).header("Network", &self.network);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RateError::UpstreamUnavailable(format!("request error for {pair}: {e}")))?;

        if !response.status().is_success() {
            return Err(RateError::UpstreamUnavailable(format!(
                "{} for {}",
                response.status(),
                pair
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| RateError::UpstreamUnavailable(format!("failed to read body for {pair}: {e}")))?;

        let quote = parse_quote(&text, pair)?;
        debug!(rate = quote.rate, "Received quote");
        Ok(quote)
    }
}
