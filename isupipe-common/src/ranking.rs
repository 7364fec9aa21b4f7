//! Leaderboard ranking over aggregated scores
//!
//! Score records are ordered ascending by score, ties broken by ascending id.
//! Rank is counted from the top of that order: the last record is rank 1 and
//! the first record is rank N. Two records never share a position.
//!
//! # Usage
//!
//! ```
//! use isupipe_common::ranking::{Ranking, ScoreEntry};
//!
//! let ranking = Ranking::new(vec![
//!     ScoreEntry::new(1_i64, 10),
//!     ScoreEntry::new(2_i64, 30),
//!     ScoreEntry::new(3_i64, 10),
//! ]);
//!
//! assert_eq!(ranking.rank_of(&2_i64).unwrap(), 1);
//! assert_eq!(ranking.rank_of(&3_i64).unwrap(), 2);
//! assert_eq!(ranking.rank_of(&1_i64).unwrap(), 3);
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::Display;

use thiserror::Error;

/// One entity's aggregated score for a ranking pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry<K> {
    /// Entity identifier (livestream id, username)
    pub id: K,
    /// Sum of weighted signals (reactions + tips)
    pub score: i64,
}

impl<K> ScoreEntry<K> {
    pub fn new(id: K, score: i64) -> Self {
        Self { id, score }
    }
}

/// Ranking failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingError {
    /// No records were supplied
    #[error("cannot rank an empty score set")]
    EmptyScoreSet,

    /// The designated entity is absent from the score set
    #[error("ranking target not found: {0}")]
    TargetNotFound(String),
}

/// Score records in ascending (score, id) order
#[derive(Debug, Clone)]
pub struct Ranking<K> {
    entries: Vec<ScoreEntry<K>>,
}

impl<K: Ord> Ranking<K> {
    /// Build a ranking, taking ownership of the records and sorting them
    pub fn new(mut entries: Vec<ScoreEntry<K>>) -> Self {
        entries.sort_by(compare_entries);
        Self { entries }
    }

    /// Records in ascending order (lowest score first)
    pub fn entries(&self) -> &[ScoreEntry<K>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based rank of `target`, counted from the highest-ordered record
    ///
    /// Walks from the end of the ascending order toward the start, so the
    /// result is `1 + number of records ordered after the target`.
    ///
    /// # Errors
    /// - [`RankingError::EmptyScoreSet`] if there are no records
    /// - [`RankingError::TargetNotFound`] if no record carries `target`
    pub fn rank_of<Q>(&self, target: &Q) -> Result<i64, RankingError>
    where
        K: Borrow<Q>,
        Q: Eq + Display + ?Sized,
    {
        if self.entries.is_empty() {
            return Err(RankingError::EmptyScoreSet);
        }

        let mut rank: i64 = 1;
        for entry in self.entries.iter().rev() {
            if entry.id.borrow() == target {
                return Ok(rank);
            }
            rank += 1;
        }

        Err(RankingError::TargetNotFound(target.to_string()))
    }
}

/// Rank `target` within `entries` in one call
pub fn rank_of<K, Q>(entries: Vec<ScoreEntry<K>>, target: &Q) -> Result<i64, RankingError>
where
    K: Ord + Borrow<Q>,
    Q: Eq + Display + ?Sized,
{
    Ranking::new(entries).rank_of(target)
}

fn compare_entries<K: Ord>(a: &ScoreEntry<K>, b: &ScoreEntry<K>) -> Ordering {
    a.score.cmp(&b.score).then_with(|| a.id.cmp(&b.id))
}
