//! Query layer for isupipe-api
//!
//! Every function takes a `&mut SqliteConnection` so handlers can run them
//! inside one transaction (`&mut tx` coerces to the connection).

pub mod livestreams;
pub mod reactions;
pub mod stats;
pub mod users;
