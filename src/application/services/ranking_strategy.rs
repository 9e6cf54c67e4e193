//! # Ranking Strategy
//!
//! Orders collected quotes best-first.
//!
//! The engine trusts `recipient_gets` as already normalized to destination
//! currency units, so ranking is a plain sort with no conversion.

use crate::domain::entities::Quote;
use rust_decimal::Decimal;
use std::fmt;

/// Trait for ranking strategies.
pub trait RankingStrategy: Send + Sync + fmt::Debug {
    /// Returns `quotes` ordered best first. Quotes that must not be
    /// surfaced are dropped.
    fn rank(&self, quotes: Vec<Quote>) -> Vec<Quote>;

    /// Returns the name of this ranking strategy.
    fn name(&self) -> &'static str;
}

/// Ranks by amount received, highest first.
///
/// Equal amounts are ordered by provider id ascending, so the result does
/// not depend on which provider answered first.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipientGetsStrategy;

impl RecipientGetsStrategy {
    /// Creates a new strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RankingStrategy for RecipientGetsStrategy {
    fn rank(&self, mut quotes: Vec<Quote>) -> Vec<Quote> {
        quotes.retain(|q| q.recipient_gets() > Decimal::ZERO);
        quotes.sort_by(|a, b| {
            b.recipient_gets()
                .cmp(&a.recipient_gets())
                .then_with(|| a.provider().cmp(b.provider()))
        });
        quotes
    }

    fn name(&self) -> &'static str {
        "RecipientGets"
    }
}
