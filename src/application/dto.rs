//! # Data Transfer Objects
//!
//! Request and response shapes of the quote use case.

use crate::domain::entities::{Query, Quote};
use crate::domain::value_objects::Timestamp;
use serde::{Deserialize, Serialize};

/// Raw quote request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteRequest {
    /// Destination country, free text.
    pub receive_country: String,
    /// Destination currency code.
    pub receive_currency: String,
    /// Amount to send in send-currency units.
    pub send_amount: i64,
    /// Send currency; KRW when absent.
    #[serde(default)]
    pub send_currency: Option<String>,
}

impl QuoteRequest {
    /// Creates a request with the default send currency.
    #[must_use]
    pub fn new(
        receive_country: impl Into<String>,
        receive_currency: impl Into<String>,
        send_amount: i64,
    ) -> Self {
        Self {
            receive_country: receive_country.into(),
            receive_currency: receive_currency.into(),
            send_amount,
            send_currency: None,
        }
    }
}

/// Ranked quotes for one query.
///
/// Built once per uncached query and returned unchanged on cache hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResponse {
    /// Destination country, display-capitalised.
    pub country: String,
    /// Destination currency.
    pub currency: String,
    /// Send amount.
    pub amount: u64,
    /// Send currency.
    pub send_currency: String,
    /// When the quotes were collected.
    pub generated_at: Timestamp,
    /// Quotes sorted by recipient amount, best first.
    pub results: Vec<Quote>,
    /// Head of `results`.
    pub best_rate_provider: Option<Quote>,
}

impl AggregatedResponse {
    /// Builds a response from ranked quotes.
    #[must_use]
    pub fn from_ranked(query: &Query, results: Vec<Quote>) -> Self {
        Self {
            country: query.country().display_name().to_string(),
            currency: query.currency().to_string(),
            amount: query.send_amount(),
            send_currency: query.send_currency().to_string(),
            generated_at: Timestamp::now(),
            best_rate_provider: results.first().cloned(),
            results,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ProviderId;
    use rust_decimal::Decimal;

    fn quote(provider: &str, gets: i64) -> Quote {
        Quote::new(
            ProviderId::new(provider),
            Decimal::from(18),
            Decimal::from(5000),
            Decimal::from(gets),
        )
        .unwrap()
    }

    #[test]
    fn best_is_head_of_results() {
        let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();
        let response =
            AggregatedResponse::from_ranked(&query, vec![quote("B", 200), quote("A", 100)]);

        assert_eq!(response.country, "Vietnam");
        assert_eq!(response.currency, "VND");
        assert_eq!(response.amount, 1_000_000);
        assert_eq!(response.send_currency, "KRW");
        assert_eq!(response.best_rate_provider.as_ref(), response.results.first());
    }

    #[test]
    fn empty_results_have_no_best() {
        let query = Query::parse("nepal", "NPR", 10).unwrap();
        let response = AggregatedResponse::from_ranked(&query, Vec::new());
        assert!(response.best_rate_provider.is_none());
    }

    #[test]
    fn serializes_with_wire_keys() {
        let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();
        let response = AggregatedResponse::from_ranked(&query, vec![quote("A", 100)]);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("results").is_some());
        assert!(json.get("best_rate_provider").is_some());
        assert!(json.get("generated_at").is_some());
    }

    #[test]
    fn request_send_currency_is_optional() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{"receive_country":"vietnam","receive_currency":"VND","send_amount":1000}"#,
        )
        .unwrap();
        assert_eq!(request, QuoteRequest::new("vietnam", "VND", 1000));
    }
}
