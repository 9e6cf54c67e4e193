//! # E9Pay Adapter
//!
//! Form-encoded calculator endpoint. A business result code other than
//! `0000` is a rejection even when the HTTP status is 200.

use crate::domain::entities::{Query, Quote};
use crate::domain::value_objects::{Country, ProviderId};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::payload::{decimal_or_zero, recipient_gets, required_decimal};
use crate::infrastructure::providers::traits::ProviderAdapter;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER};
use serde::Serialize;
use serde_json::Value;

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.e9pay.co.kr";

const PUBLIC_LINK: &str = "https://www.e9pay.co.kr/";
const SUCCESS_CODE: &str = "0000";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalcForm<'a> {
    calc_kind: &'static str,
    send_country_cd: &'static str,
    recv_country_cd: &'a str,
    recv_currency_cd: &'a str,
    send_amt: String,
}

/// E9Pay provider adapter.
#[derive(Debug, Clone)]
pub struct E9PayAdapter {
    id: ProviderId,
    base_url: String,
    client: HttpClient,
}

impl E9PayAdapter {
    /// Creates an adapter against `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: HttpClient) -> Self {
        Self {
            id: ProviderId::new("E9Pay"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.e9pay.co.kr"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.e9pay.co.kr/"));
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers
    }
}

#[async_trait]
impl ProviderAdapter for E9PayAdapter {
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

        let currency = query.currency();
        let form = CalcForm {
            calc_kind: "SE",
            send_country_cd: "KR",
            recv_country_cd: query.country().iso_code(),
            recv_currency_cd: currency.as_str(),
            send_amt: query.send_amount().to_string(),
        };

        let body: Value = self
            .client
            .post_form(
                &format!("{}/cmm/calcExchangeRate.do", self.base_url),
                &form,
                Self::headers(),
            )
            .await?;

        let code = body.get("resultCd").and_then(Value::as_str);
        if code != Some(SUCCESS_CODE) {
            let message = body
                .get("resultMsg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(ProviderError::rejected(code.map(str::to_string), message));
        }

        let exchange_rate = required_decimal(&body, "exchRate")?;
        let fee = decimal_or_zero(&body, "chargeAmt")?;
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
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> E9PayAdapter {
        E9PayAdapter::new(server.uri(), HttpClient::new(2000).unwrap())
    }

    #[tokio::test]
    async fn parses_successful_calculation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cmm/calcExchangeRate.do"))
            .and(body_string_contains("recvCountryCd=PH"))
            .and(body_string_contains("sendAmt=1000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCd": "0000",
                "exchRate": "0.0415",
                "chargeAmt": "5,000"
            })))
            .mount(&server)
            .await;

        let query = Query::parse("philippines", "PHP", 1_000_000).unwrap();
        let quote = adapter(&server).quote(&query).await.unwrap();

        assert_eq!(quote.provider().as_str(), "E9Pay");
        assert_eq!(quote.fee(), Decimal::from(5000));
        assert_eq!(quote.recipient_gets(), Decimal::new(4_129_250, 2));
    }

    #[tokio::test]
    async fn business_error_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCd": "9001",
                "resultMsg": "service unavailable"
            })))
            .mount(&server)
            .await;

        let query = Query::parse("vietnam", "VND", 1_000_000).unwrap();
        let err = adapter(&server).quote(&query).await.unwrap_err();
        assert_eq!(err.code(), Some("9001"));
        assert!(!err.is_transport_failure());
    }
}
