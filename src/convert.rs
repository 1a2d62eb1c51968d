use crate::model::Currency;
use crate::rates::RateCache;
use std::collections::HashMap;
use tracing::debug;

/// Upper bound on memoized (from, to, version) factors. Matches the lookup
/// breadth of a handful of currencies over a table version or two; when the
/// map fills up it is simply dropped and rebuilt.
const MEMO_CAPACITY: usize = 128;

/// Computes conversion factors between currency pairs through the base
/// currency of the rate table.
///
/// The policy is fail-open: a missing rate, or no table at all, yields a
/// factor of 1.0 so callers always get a number. Converted amounts are a
/// best effort, not an exact quote.
pub struct CurrencyConverter {
    cache: RateCache,
    memo: HashMap<(Currency, Currency, u64), f64>,
}

impl CurrencyConverter {
    pub fn new(cache: RateCache) -> Self {
        CurrencyConverter {
            cache,
            memo: HashMap::new(),
        }
    }

    pub fn rate_cache(&self) -> &RateCache {
        &self.cache
    }

    /// Factor such that `amount_from * factor` is the equivalent in `to`.
    ///
    /// Cross pairs are routed through the base currency:
    /// `(1/rates[from]) * rates[to]`. That compounds two quotes and is not
    /// guaranteed to equal a directly fetched cross rate; the approximation
    /// is intentional and kept.
    pub async fn factor(&mut self, from: Currency, to: Currency) -> f64 {
        if from == to {
            return 1.0;
        }

        let version = self.cache.ensure_fresh().await;
        let key = (from, to, version);
        if let Some(factor) = self.memo.get(&key) {
            debug!(%from, %to, version, "Factor memo hit");
            return *factor;
        }

        let factor = match self.cache.table() {
            Some(table) => {
                let base = table.base();
                // Missing entries pass through at 1.0.
                let rate_of = |c: Currency| table.rate(c).unwrap_or(1.0);
                if from == base {
                    rate_of(to)
                } else if to == base {
                    1.0 / rate_of(from)
                } else {
                    (1.0 / rate_of(from)) * rate_of(to)
                }
            }
            None => 1.0,
        };

        if self.memo.len() >= MEMO_CAPACITY {
            self.memo.clear();
        }
        self.memo.insert(key, factor);
        factor
    }

    pub async fn convert(&mut self, amount: f64, from: Currency, to: Currency) -> f64 {
        amount * self.factor(from, to).await
    }
}

/// Renders an amount with thousands separators and two decimals, prefixed
/// with the currency symbol — except the canonical currency, which is
/// suffixed with its code.
pub fn format_amount(amount: f64, currency: Currency) -> String {
    let digits = group_thousands(amount.abs());
    let sign = if amount < 0.0 { "-" } else { "" };
    if currency == Currency::CANONICAL {
        format!("{sign}{digits} {}", currency.symbol())
    } else {
        format!("{sign}{}{digits}", currency.symbol())
    }
}

fn group_thousands(amount: f64) -> String {
    let formatted = format!("{amount:.2}");
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped}.{frac_part}")
}
