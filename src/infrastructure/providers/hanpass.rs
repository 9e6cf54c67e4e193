//! # Hanpass Adapter
//!
//! JSON-over-HTTPS quote endpoint. The upstream reports the exchange rate
//! and fee; the recipient amount is derived locally.

use crate::domain::entities::{Query, Quote};
use crate::domain::value_objects::{Country, ProviderId};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::payload::{decimal_or_zero, recipient_gets, required_decimal};
use crate::infrastructure::providers::traits::ProviderAdapter;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::Serialize;
use serde_json::Value;

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.hanpass.com";

const PUBLIC_LINK: &str = "https://www.hanpass.com/";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CostRequest<'a> {
    input_amount: String,
    input_currency_code: &'a str,
    to_currency_code: &'a str,
    to_country_code: &'a str,
    lang: &'static str,
}

/// Hanpass provider adapter.
#[derive(Debug, Clone)]
pub struct HanpassAdapter {
    id: ProviderId,
    base_url: String,
    client: HttpClient,
}

impl HanpassAdapter {
    /// Creates an adapter against `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: HttpClient) -> Self {
        Self {
            id: ProviderId::new("Hanpass"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.hanpass.com"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.hanpass.com/en/"));
        headers
    }
}

#[async_trait]
impl ProviderAdapter for HanpassAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    fn supports(&self, query: &Query) -> bool {
        query.country() != Country::Mongolia
    }

    async fn quote(&self, query: &Query) -> ProviderResult<Quote> {
        if !self.supports(query) {
            return Err(ProviderError::unsupported(format!(
                "{}:{}",
                query.country(),
                query.currency()
            )));
        }

        let send_currency = query.send_currency();
        let currency = query.currency();
        let request = CostRequest {
            input_amount: query.send_amount().to_string(),
            input_currency_code: send_currency.as_str(),
            to_currency_code: currency.as_str(),
            to_country_code: query.country().iso_code(),
            lang: "en",
        };

        let body: Value = self
            .client
            .post_json(&format!("{}/getCost", self.base_url), &request, Self::headers())
            .await?;

        let exchange_rate = required_decimal(&body, "exchangeRate")?;
        let fee = decimal_or_zero(&body, "transferFee")?;
        let recipient_gets = recipient_gets(query.send_amount_decimal(), fee, exchange_rate)?;

        Ok(Quote::builder(self.id.clone(), exchange_rate, fee, recipient_gets)
            .transfer_method("Bank Transfer")
            .link(PUBLIC_LINK)
            .build()?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn adapter(server: &MockServer) -> HanpassAdapter {
        HanpassAdapter::new(server.uri(), HttpClient::new(2000).unwrap())
    }

    #[tokio::test]
    async fn parses_cost_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getCost"))
            .and(body_partial_json(json!({
                "inputAmount": "1000000",
                "inputCurrencyCode": "KRW",
                "toCurrencyCode": "VND",
                "toCountryCode": "VN",
                "lang": "en"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "exchangeRate": "18.52",
                "transferFee": 5000
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();
        let quote = adapter(&server).await.quote(&query).await.unwrap();

        assert_eq!(quote.provider().as_str(), "Hanpass");
        assert_eq!(quote.fee(), Decimal::from(5000));
        assert_eq!(quote.recipient_gets(), Decimal::from(18_427_400));
        assert_eq!(quote.transfer_method(), Some("Bank Transfer"));
    }

    #[tokio::test]
    async fn zero_rate_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "exchangeRate": 0,
                "transferFee": 0
            })))
            .mount(&server)
            .await;

        let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();
        let err = adapter(&server).await.quote(&query).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidQuote(_)));
    }

    #[tokio::test]
    async fn overflowing_rate_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "exchangeRate": "79228162514264337593543950335",
                "transferFee": 0
            })))
            .mount(&server)
            .await;

        let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();
        let err = adapter(&server).await.quote(&query).await.unwrap_err();
        assert!(matches!(err, ProviderError::ProtocolError { .. }));
    }

    #[tokio::test]
    async fn http_error_surfaces_as_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let query = Query::parse("nepal", "NPR", 500_000).unwrap();
        let err = adapter(&server).await.quote(&query).await.unwrap_err();
        assert!(matches!(err, ProviderError::HttpStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn mongolia_is_not_served() {
        let server = MockServer::start().await;
        let query = Query::parse("mongolia", "MNT", 500_000).unwrap();
        let err = adapter(&server).await.quote(&query).await.unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedCorridor { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
