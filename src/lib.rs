//! Data layer for the PDS economic-statistics dashboard.
//!
//! Loads Indonesian inflation, BI-7Day-RR policy-rate and JISDOR
//! exchange-rate series from an optional hosted table service, falling
//! back to local spreadsheet exports, and normalizes everything into
//! canonical, strongly-typed tables. All stringly-typed column handling
//! lives inside this crate; consumers only ever see [`schema::Table`].

use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod fetch;
pub mod fx;
pub mod load;
pub mod schema;
pub mod sheet;
pub mod stats;

pub use config::ServiceConfig;
pub use load::{LoadOptions, Loaded, Loader, Source};
pub use schema::{Dataset, InflationRecord, RateRecord, Table};

/// Install the default `tracing` subscriber (env-filtered, compact).
///
/// Embedding applications call this once at startup; repeated calls are
/// no-ops so library consumers that bring their own subscriber win.
pub fn init_logging() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt::Subscriber::builder().with_env_filter(env).try_init();
}
