//! Build timestamp resolution (spec §4.9 "Timestamp semantics"):
//! `SOURCE_DATE_EPOCH` is authoritative when set, else the current UTC time.

use chrono::{DateTime, Utc};

/// The timestamp an [`crate::scmversion::ScmVersion`] should carry as its
/// `time` field.
pub fn build_time() -> DateTime<Utc> {
    source_date_epoch().unwrap_or_else(Utc::now)
}

fn source_date_epoch() -> Option<DateTime<Utc>> {
    let raw = std::env::var("SOURCE_DATE_EPOCH").ok()?;
    let seconds: i64 = raw.trim().parse().ok()?;
    DateTime::from_timestamp(seconds, 0)
}
