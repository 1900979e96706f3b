use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Signal, SignalLevel, SignalStatus};

/// Inclusive time window `[start, end]`.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignalFilter {
    pub status: Option<SignalStatus>,
    pub level: Option<SignalLevel>,
}

impl SignalFilter {
    pub fn matches(&self, signal: &Signal) -> bool {
        self.status.map_or(true, |s| signal.status == s)
            && self.level.map_or(true, |l| signal.level == Some(l))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelBreakdown {
    pub total: usize,
    pub by_status: BTreeMap<SignalStatus, usize>,
    /// Executed share in percent; `None` when the level has no signals.
    pub execution_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSummary {
    pub total: usize,
    pub by_status: BTreeMap<SignalStatus, usize>,
    pub by_level: BTreeMap<SignalLevel, LevelBreakdown>,
    /// Signals recorded without a level.
    pub unleveled: usize,
    pub pending: usize,
    pub average_confidence: Option<Decimal>,
}

fn zeroed_statuses() -> BTreeMap<SignalStatus, usize> {
    SignalStatus::ALL.iter().map(|s| (*s, 0)).collect()
}

/// `executed / total * 100`, or `None` for an empty level.
pub fn execution_rate(executed: usize, total: usize) -> Option<Decimal> {
    if total == 0 {
        return None;
    }
    Some(Decimal::from(executed as u64) / Decimal::from(total as u64) * Decimal::ONE_HUNDRED)
}

/// Signals inside the window that pass the filter.
pub fn select<'a>(signals: &'a [Signal], window: &TimeWindow, filter: &SignalFilter) -> Vec<&'a Signal> {
    signals
        .iter()
        .filter(|s| window.contains(s.created_at) && filter.matches(s))
        .collect()
}

pub fn summarize(signals: &[Signal], window: &TimeWindow, filter: &SignalFilter) -> SignalSummary {
    let selected = select(signals, window, filter);

    let mut by_status = zeroed_statuses();
    let mut by_level: BTreeMap<SignalLevel, BTreeMap<SignalStatus, usize>> = SignalLevel::ALL
        .iter()
        .map(|l| (*l, zeroed_statuses()))
        .collect();
    let mut unleveled = 0;

    for signal in &selected {
        *by_status.entry(signal.status).or_default() += 1;
        match signal.level {
            Some(level) => {
                *by_level
                    .entry(level)
                    .or_insert_with(zeroed_statuses)
                    .entry(signal.status)
                    .or_default() += 1;
            }
            None => unleveled += 1,
        }
    }

    let by_level = by_level
        .into_iter()
        .map(|(level, counts)| {
            let total: usize = counts.values().sum();
            let executed = counts.get(&SignalStatus::Executed).copied().unwrap_or(0);
            (
                level,
                LevelBreakdown {
                    total,
                    by_status: counts,
                    execution_rate: execution_rate(executed, total),
                },
            )
        })
        .collect();

    let average_confidence = if selected.is_empty() {
        None
    } else {
        let sum: Decimal = selected.iter().map(|s| s.confidence).sum();
        Some(sum / Decimal::from(selected.len() as u64))
    };

    SignalSummary {
        total: selected.len(),
        pending: by_status.get(&SignalStatus::Pending).copied().unwrap_or(0),
        by_status,
        by_level,
        unleveled,
        average_confidence,
    }
}

/// Newest first; equal timestamps fall back to ascending id.
pub fn sort_for_display(signals: &mut [Signal]) {
    signals.sort_by(|a, b| match b.created_at.cmp(&a.created_at) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
