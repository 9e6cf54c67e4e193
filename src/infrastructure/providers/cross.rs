//! # Cross Adapter
//!
//! GET quote endpoint keyed by a platform id per destination.
//!
//! The upstream `service_rate` is sometimes quoted the other way round
//! (send units per destination unit). When the derived amount is
//! implausibly large the rate is inverted before deriving the recipient
//! amount; the quote then reports the inverted rate so that
//! `recipient_gets == (send - fee) * exchange_rate` holds.

use crate::domain::entities::{Query, Quote};
use crate::domain::value_objects::{Country, ProviderId};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::payload::{decimal_or_zero, recipient_gets, required_decimal};
use crate::infrastructure::providers::traits::ProviderAdapter;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://crossenf.com";

const PUBLIC_LINK: &str = "https://crossenf.com/";

/// Fee assumed when the upstream reports none.
pub const DEFAULT_FEE: u32 = 5000;

/// Derived amounts above this trigger rate inversion, whatever the
/// destination currency.
pub const INVERSION_THRESHOLD: u32 = 1_000_000;

/// Returns the upstream platform id for `country`.
#[must_use]
pub const fn platform_id(country: Country) -> u32 {
    match country {
        Country::Vietnam => 144,
        Country::Philippines => 20,
        Country::Indonesia => 68,
        Country::Thailand => 60,
        Country::Nepal => 85,
        Country::Cambodia => 150,
        Country::Myanmar => 235,
        Country::Uzbekistan => 233,
        Country::Bangladesh => 76,
        Country::Mongolia => 250,
        Country::SriLanka => 75,
    }
}

#[derive(Debug, Serialize)]
struct QuoteParams {
    apply_user_limit: u8,
    deposit_type: &'static str,
    platform_id: u32,
    quote_type: &'static str,
    sending_amount: u64,
}

/// Cross provider adapter.
#[derive(Debug, Clone)]
pub struct CrossAdapter {
    id: ProviderId,
    base_url: String,
    client: HttpClient,
}

impl CrossAdapter {
    /// Creates an adapter against `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, client: HttpClient) -> Self {
        Self {
            id: ProviderId::new("Cross"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Returns `(exchange_rate, recipient_gets)` after normalizing the rate
    /// orientation.
    ///
    /// The threshold is a single absolute figure for every destination, so
    /// high-denomination currencies (VND, IDR, UZS, MNT) invert at ordinary
    /// send amounts. The upstream quotes those corridors the other way round.
    fn normalize(
        send_amount: Decimal,
        fee: Decimal,
        service_rate: Decimal,
    ) -> ProviderResult<(Decimal, Decimal)> {
        let direct = recipient_gets(send_amount, fee, service_rate)?;
        if direct <= Decimal::from(INVERSION_THRESHOLD) {
            return Ok((service_rate, direct));
        }
        match Decimal::ONE.checked_div(service_rate) {
            Some(inverted) => Ok((inverted, recipient_gets(send_amount, fee, inverted)?)),
            None => Ok((service_rate, direct)),
        }
    }
}

#[async_trait]
impl ProviderAdapter for CrossAdapter {
    fn provider_id(&self) -> &ProviderId {
        &self.id
    }

    async fn quote(&self, query: &Query) -> ProviderResult<Quote> {
        let params = QuoteParams {
            apply_user_limit: 0,
            deposit_type: "Manual",
            platform_id: platform_id(query.country()),
            quote_type: "send",
            sending_amount: query.send_amount(),
        };

        let body: Value = self
            .client
            .get_with_params(
                &format!("{}/api/v4/remit/quote/", self.base_url),
                &params,
                HeaderMap::new(),
            )
            .await?;

        let data = body
            .get("data")
            .ok_or_else(|| ProviderError::protocol_error("missing 'data'"))?;
        let service_rate = required_decimal(data, "service_rate")?;
        if service_rate.is_zero() {
            return Err(ProviderError::rejected(None, "service_rate is zero"));
        }
        let mut fee = decimal_or_zero(data, "fee")?;
        if fee.is_zero() {
            fee = Decimal::from(DEFAULT_FEE);
        }

        let (exchange_rate, recipient_gets) =
            Self::normalize(query.send_amount_decimal(), fee, service_rate)?;
        tracing::debug!(
            provider = %self.id,
            %service_rate,
            %exchange_rate,
            %recipient_gets,
            "cross rate normalized"
        );

        Ok(Quote::builder(self.id.clone(), exchange_rate, fee, recipient_gets)
            .link(PUBLIC_LINK)
            .build()?)
    }
}
