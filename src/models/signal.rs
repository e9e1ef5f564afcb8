//! Signal kinds, emitted signals and the per-subject dedup cache.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    MaBuy,
    MaSell,
    TrendBuy,
    TrendSell,
    InfoPeakHigh,
    InfoLineHigh,
    InfoPeakLow,
    InfoLineLow,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::MaBuy => "ma_buy",
            SignalKind::MaSell => "ma_sell",
            SignalKind::TrendBuy => "trend_buy",
            SignalKind::TrendSell => "trend_sell",
            SignalKind::InfoPeakHigh => "info_peak_high",
            SignalKind::InfoLineHigh => "info_line_high",
            SignalKind::InfoPeakLow => "info_peak_low",
            SignalKind::InfoLineLow => "info_line_low",
        }
    }

    /// Informational kinds describe pivots rather than suggest a trade.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            SignalKind::InfoPeakHigh
                | SignalKind::InfoLineHigh
                | SignalKind::InfoPeakLow
                | SignalKind::InfoLineLow
        )
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fractal_index: Option<usize>,
}

impl Signal {
    pub fn new(kind: SignalKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fractal_index: None,
        }
    }

    pub fn with_fractal_index(mut self, index: usize) -> Self {
        self.fractal_index = Some(index);
        self
    }
}

/// Kinds already sent during the period opened at `period_timestamp`.
///
/// `sent_kinds` is only meaningful relative to `period_timestamp`; use
/// [`SignalCache::for_period`] before reading it against a new window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCache {
    pub period_timestamp: i64,
    #[serde(default)]
    pub sent_kinds: BTreeSet<SignalKind>,
}

impl SignalCache {
    pub fn new(period_timestamp: i64) -> Self {
        Self {
            period_timestamp,
            sent_kinds: BTreeSet::new(),
        }
    }

    /// Returns this cache if it belongs to `open_time`, otherwise a fresh
    /// empty cache stamped with `open_time`.
    pub fn for_period(self, open_time: i64) -> Self {
        if self.period_timestamp == open_time {
            self
        } else {
            Self::new(open_time)
        }
    }

    pub fn contains(&self, kind: SignalKind) -> bool {
        self.sent_kinds.contains(&kind)
    }

    /// Records `kind`, returning `false` if it was already sent this period.
    pub fn record(&mut self, kind: SignalKind) -> bool {
        self.sent_kinds.insert(kind)
    }
}

/// Result of one evaluation: signals to deliver and the cache to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub new_signals: Vec<Signal>,
    pub updated_cache: SignalCache,
}

impl Evaluation {
    pub fn unchanged(cache: SignalCache) -> Self {
        Self {
            new_signals: Vec::new(),
            updated_cache: cache,
        }
    }
}
