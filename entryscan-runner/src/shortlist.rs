//! Ranked shortlist: bounded, sorted by confidence, ties in universe order.
//!
//! Built from the scored records of one scan. Records below the selection
//! threshold never enter; the rest are sorted descending by confidence with a
//! stable sort, so equal scores keep the order in which the universe lists
//! them. At most `MAX_SHORTLIST` entries survive.

use entryscan_core::domain::ScoreRecord;
use serde::{Deserialize, Serialize};

use crate::config::MAX_SHORTLIST;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedShortlist {
    records: Vec<ScoreRecord>,
    min_confidence: f64,
}

impl RankedShortlist {
    /// Rank `scored` (in universe order). `max_size` is capped at `MAX_SHORTLIST`.
    pub fn rank(scored: &[ScoreRecord], min_confidence: f64, max_size: usize) -> Self {
        let mut records: Vec<ScoreRecord> = scored
            .iter()
            .filter(|r| r.confidence >= min_confidence)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        records.truncate(max_size.min(MAX_SHORTLIST));
        Self {
            records,
            min_confidence,
        }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// No instrument met the threshold. A valid outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn top(&self) -> Option<&ScoreRecord> {
        self.records.first()
    }

    /// Look up a shortlisted record by symbol (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<&ScoreRecord> {
        self.records
            .iter()
            .find(|r| r.instrument.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RankedShortlist {
    type Item = &'a ScoreRecord;
    type IntoIter = std::slice::Iter<'a, ScoreRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
