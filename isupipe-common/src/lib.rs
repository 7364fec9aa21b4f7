//! # isupipe Common Library
//!
//! Shared code for the isupipe livestream backend:
//! - Database schema initialization and row models
//! - Session storage
//! - Leaderboard ranking
//! - In-memory tag cache
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod ranking;
pub mod tag_cache;
pub mod time;

pub use error::{Error, Result};
pub use ranking::{rank_of, Ranking, RankingError, ScoreEntry};
pub use tag_cache::{Tag, TagCache};
