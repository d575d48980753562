//! # Deliberation Service
//!
//! Civic deliberation & voting engine: proposals/polls embedded in posts,
//! comment threads, promotion of a comment to a first-class voting option,
//! and per-user vote/like bookkeeping that stays consistent under concurrent
//! writers.
//!
//! Every mutating operation is a single atomic transaction against the
//! document store; subscribed clients receive the updated document via the
//! store's snapshot primitive. The engine holds no state of its own.
//!
//! # Modules
//!
//! - `models`: Document shapes for posts, polls, and comments
//! - `services`: Business logic layer (like toggling, voting, option
//!   proposals, discussion flow, comment tree building)
//! - `error`: Error types and handling
//! - `config`: Configuration management

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
