//! Rewards Ledger API Service
//!
//! HTTP surface consumed by the excluded session/presentation layer. The
//! core trusts the resolved `user_id` and `tier` carried on every
//! request; authentication happens upstream.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod monitoring;
pub mod routes;
pub mod server;

pub use server::ApiServer;
