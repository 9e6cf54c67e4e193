//! # GME Adapter
//!
//! Form POST against the public exchange-rate page, which answers with JSON
//! whose amounts carry thousands separators.

use crate::domain::entities::{Query, Quote};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::error::ProviderResult;
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::payload::{decimal_or_zero, recipient_gets, required_decimal};
use crate::infrastructure::providers::traits::ProviderAdapter;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::Serialize;
use serde_json::Value;

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://online.gmeremit.com";

const PUBLIC_LINK: &str = "https://online.gmeremit.com/";

/// Bank deposit.
const DELIVERY_METHOD_BANK: &str = "2";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExRateForm<'a> {
    method: &'static str,
    #[serde(rename = "pCurr")]
    p_curr: &'a str,
    #[serde(rename = "pCountryName")]
    p_country_name: &'a str,
    coll_curr: &'a str,
    delivery_method: &'static str,
    #[serde(rename = "cAmt")]
    c_amt: String,
    #[serde(rename = "pAmt")]
    p_amt: &'static str,
    card_online: &'static str,
    cal_by: &'static str,
}

/// GME provider adapter.
#[derive(Debug, Clone)]
pub struct GmeAdapter {
    id: ProviderId,
    base_url: String,
    client: HttpClient,
}

impl GmeAdapter {
    /// Creates an adapter against `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: HttpClient) -> Self {
        Self {
            id: ProviderId::new("GME"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://online.gmeremit.com"));
        headers.insert(
            REFERER,
            HeaderValue::from_static("https://online.gmeremit.com/ExchangeRate.aspx?width=auto"),
        );
        headers
    }
}

#[async_trait]
impl ProviderAdapter for GmeAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    async fn quote(&self, query: &Query) -> ProviderResult<Quote> {
        let currency = query.currency();
        let send_currency = query.send_currency();
        let form = ExRateForm {
            method: "GetExRate",
            p_curr: currency.as_str(),
            p_country_name: query.country().key(),
            coll_curr: send_currency.as_str(),
            delivery_method: DELIVERY_METHOD_BANK,
            c_amt: query.send_amount().to_string(),
            p_amt: "0",
            card_online: "false",
            cal_by: "C",
        };

        let body: Value = self
            .client
            .post_form(
                &format!("{}/ExchangeRate.aspx", self.base_url),
                &form,
                Self::headers(),
            )
            .await?;

        let exchange_rate = required_decimal(&body, "exRate")?;
        let fee = decimal_or_zero(&body, "scCharge")?;
        let recipient_gets = recipient_gets(query.send_amount_decimal(), fee, exchange_rate)?;

        Ok(Quote::builder(self.id.clone(), exchange_rate, fee, recipient_gets)
            .transfer_method("Bank Deposit")
            .link(PUBLIC_LINK)
            .build()?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::error::ProviderError;
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn strips_thousands_separators() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ExchangeRate.aspx"))
            .and(body_string_contains("method=GetExRate"))
            .and(body_string_contains("pCountryName=vietnam"))
            .and(body_string_contains("cAmt=1000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "exRate": "18.60",
                "scCharge": "2,500"
            })))
            .mount(&server)
            .await;

        let adapter = GmeAdapter::new(server.uri(), HttpClient::new(2000).unwrap());
        let query = Query::parse("Vietnam", "vnd", 1_000_000).unwrap();
        let quote = adapter.quote(&query).await.unwrap();

        assert_eq!(quote.provider().as_str(), "GME");
        assert_eq!(quote.fee(), Decimal::from(2500));
        assert_eq!(quote.recipient_gets(), Decimal::from(18_553_500));
    }

    #[tokio::test]
    async fn html_page_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let adapter = GmeAdapter::new(server.uri(), HttpClient::new(2000).unwrap());
        let query = Query::parse("nepal", "NPR", 100_000).unwrap();
        let err = adapter.quote(&query).await.unwrap_err();
        assert!(matches!(err, ProviderError::ProtocolError { .. }));
    }
}
