//! # Study Tracker
//!
//! Study time tracking on the Jalali (Solar Hijri) calendar.
//!
//! This crate provides:
//! - Exact Gregorian ↔ Jalali date conversion
//! - Local DuckDB storage for subjects and study sessions
//! - Day, Saturday-first week and Jalali month summaries
//! - A month grid of study days with bounded month navigation
//! - A countdown session timer

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod calendar;
pub mod config;
pub mod date_range;
pub mod db;
pub mod display;
pub mod error;
pub mod store;
pub mod timer;
pub mod types;

pub use analytics::{PeriodSummary, SessionAggregator, StudyDayIndex, StudyDaySet};
pub use calendar::{JalaliDate, JalaliMonth, Navigation};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use store::SessionStore;
pub use types::Seconds;

/// Application name, also the config and data directory name
pub const APP_NAME: &str = "study-tracker";
