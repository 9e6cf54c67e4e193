//! # Use Cases
//!
//! Entry points invoked by the API layer.

pub mod get_remittance_quote;

pub use get_remittance_quote::{GetRemittanceQuoteUseCase, QuoteCache};
