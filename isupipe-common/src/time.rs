//! Timestamp utilities
//!
//! All timestamps stored by isupipe are Unix epoch seconds.

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as Unix epoch seconds
pub fn unix_now() -> i64 {
    now().timestamp()
}
