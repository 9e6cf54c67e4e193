//! # Infrastructure Layer
//!
//! Adapters to the outside world.
//!
//! - [`providers`]: upstream quote services
//! - [`proxy`]: egress proxy pool
//! - [`config`]: layered application settings

pub mod config;
pub mod providers;
pub mod proxy;
