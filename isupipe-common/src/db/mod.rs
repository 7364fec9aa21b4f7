//! Database schema, row models and session storage

pub mod init;
pub mod models;
pub mod sessions;

pub use init::*;
pub use models::*;
pub use sessions::*;
