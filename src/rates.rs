use crate::error::RateFetchError;
use crate::model::Currency;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// How long a fetched rate table is trusted before the next conversion
/// triggers a refresh attempt.
pub fn rate_ttl() -> Duration {
    Duration::hours(1)
}

/// Exchange rates relative to a base currency, stamped with fetch time.
#[derive(Debug, Clone)]
pub struct RateTable {
    base: Currency,
    rates: HashMap<Currency, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    pub fn new(base: Currency, mut rates: HashMap<Currency, f64>, fetched_at: DateTime<Utc>) -> Self {
        // One unit of base is always one unit of base.
        rates.insert(base, 1.0);
        RateTable {
            base,
            rates,
            fetched_at,
        }
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Factor expressing one unit of the base in `currency`.
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rates.get(&currency).copied()
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at > rate_ttl()
    }
}

/// Source of exchange rates for a base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self, base: Currency) -> Result<HashMap<Currency, f64>, RateFetchError>;
}

/// exchangerate-api.com `v4/latest` endpoint. The payload lists factors for
/// every currency it knows; only the supported codes are kept.
pub struct ExchangeRateApi {
    base_url: String,
}

impl ExchangeRateApi {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.exchangerate-api.com";

    pub fn new(base_url: &str) -> Self {
        ExchangeRateApi {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateSource for ExchangeRateApi {
    async fn fetch(&self, base: Currency) -> Result<HashMap<Currency, f64>, RateFetchError> {
        let url = format!("{}/v4/latest/{}", self.base_url, base.code());
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder().user_agent("kasa/0.1").build()?;
        let response = client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;

        let data: LatestRatesResponse = serde_json::from_str(&text)?;

        let mut rates = HashMap::new();
        for currency in Currency::ALL {
            if let Some(rate) = data.rates.get(currency.code()) {
                rates.insert(currency, *rate);
            }
        }

        if rates.is_empty() {
            return Err(RateFetchError::MissingRates);
        }
        Ok(rates)
    }
}

/// The single process-wide holder of the rate table.
///
/// Refresh is triggered lazily from conversions: one fetch attempt when the
/// table is missing or older than the TTL, no retries. A failed attempt keeps
/// the last known table (stale rates beat no rates); if nothing has ever been
/// fetched the converter falls through to identity factors.
pub struct RateCache {
    base: Currency,
    source: Box<dyn RateSource>,
    table: Option<RateTable>,
    version: u64,
}

impl RateCache {
    pub fn new(source: Box<dyn RateSource>) -> Self {
        RateCache {
            base: Currency::CANONICAL,
            source,
            table: None,
            version: 0,
        }
    }

    /// Cache seeded with an existing table; used to inject known or
    /// back-dated tables in tests.
    pub fn with_table(source: Box<dyn RateSource>, table: RateTable) -> Self {
        RateCache {
            base: table.base(),
            source,
            table: Some(table),
            version: 1,
        }
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    pub fn table(&self) -> Option<&RateTable> {
        self.table.as_ref()
    }

    /// Bumped on every successful refresh; memoized conversion factors are
    /// keyed on it so they die with the table that produced them.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Refresh the table if it is missing or stale, with a single fetch
    /// attempt. Returns the version valid for the table now in place.
    pub async fn ensure_fresh(&mut self) -> u64 {
        let needs_refresh = self.table.as_ref().is_none_or(|t| t.is_stale(Utc::now()));
        if needs_refresh {
            match self.source.fetch(self.base).await {
                Ok(rates) => {
                    self.table = Some(RateTable::new(self.base, rates, Utc::now()));
                    self.version += 1;
                    debug!(version = self.version, "Refreshed exchange rates");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to update exchange rates");
                }
            }
        }
        self.version
    }
}
