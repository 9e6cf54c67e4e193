//! # Domain Layer
//!
//! Core types of the quote comparison engine, free of I/O.
//!
//! - [`entities`]: [`Query`](entities::Query), [`Quote`](entities::Quote),
//!   [`ProxyRecord`](entities::ProxyRecord)
//! - [`value_objects`]: identifiers, corridors and timestamps
//! - [`errors`]: validation errors

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
