//! # Daywise Core Library
//!
//! This library provides the core logic of Daywise, a single-user agenda
//! manager paired with a rule-based productivity estimator. Front ends (the
//! `daywise` CLI) are thin layers that collect input, call into this crate
//! and render the result.
//!
//! ## Architecture
//!
//! - **Agenda**: an in-memory [`EventStore`] owned by one session. Events are
//!   listed in date/time order, filtered by day and deleted by their position
//!   in the sorted view. Nothing is persisted; CSV exchange is explicit.
//! - **Productivity**: a pure, fixed linear [`predict`] function from sleep,
//!   focus, workload and exercise to a 0–100 score with improvement tips.
//! - **Storage**: TOML-based configuration of form defaults.
//!
//! ## Key Components
//!
//! - [`EventStore`]: session agenda
//! - [`ScoringInput`] / [`Prediction`]: productivity estimate
//! - [`Config`]: application configuration management

pub mod agenda;
pub mod error;
pub mod productivity;
pub mod storage;

pub use agenda::{Event, EventStore};
pub use error::{ConfigError, CoreError, RangeError, ValidationError};
pub use productivity::{predict, Outlook, Prediction, ScoringInput, Tip};
pub use storage::Config;
