//! Cue statistics: one record per presented cue, closed exactly once.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cue::{Cue, CueType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueStatistic {
    pub id: Uuid,
    pub cue_id: Uuid,
    pub cue_title: String,
    pub cue_type: CueType,
    pub shown_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dismissed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl CueStatistic {
    /// Open a record for a cue being presented.
    pub fn shown(cue: &Cue, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cue_id: cue.id,
            cue_title: cue.title.clone(),
            cue_type: cue.cue_type,
            shown_at: at,
            completed_at: None,
            dismissed_at: None,
            completed: false,
        }
    }

    /// Close as completed. Consumes the open record.
    pub fn complete(mut self, at: DateTime<Utc>) -> Self {
        self.completed = true;
        self.completed_at = Some(at);
        self.dismissed_at = None;
        self
    }

    /// Close as dismissed (also used for timeouts).
    pub fn dismiss(mut self, at: DateTime<Utc>) -> Self {
        self.completed = false;
        self.dismissed_at = Some(at);
        self.completed_at = None;
        self
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        if self.completed {
            self.completed_at
        } else {
            self.dismissed_at
        }
    }

    pub fn response_time(&self) -> Option<Duration> {
        self.closed_at().map(|at| at - self.shown_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub completed: usize,
    pub dismissed: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.completed + self.dismissed
    }

    /// Percentage 0.0..=100.0; 0 when nothing was recorded.
    pub fn completion_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total() as f64 * 100.0
    }

    fn record(&mut self, completed: bool) {
        if completed {
            self.completed += 1;
        } else {
            self.dismissed += 1;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub totals: OutcomeCounts,
    pub completion_rate: f64,
    pub by_type: BTreeMap<String, OutcomeCounts>,
    pub avg_response_secs: Option<f64>,
}

impl StatisticsSummary {
    pub fn from_records(records: &[CueStatistic]) -> Self {
        let mut totals = OutcomeCounts::default();
        let mut by_type: BTreeMap<String, OutcomeCounts> = BTreeMap::new();
        let mut response_secs = Vec::new();

        for r in records {
            totals.record(r.completed);
            by_type
                .entry(r.cue_type.to_string())
                .or_default()
                .record(r.completed);
            if let Some(d) = r.response_time() {
                response_secs.push(d.num_milliseconds() as f64 / 1000.0);
            }
        }

        let avg_response_secs = if response_secs.is_empty() {
            None
        } else {
            Some(response_secs.iter().sum::<f64>() / response_secs.len() as f64)
        };

        Self {
            completion_rate: totals.completion_rate(),
            totals,
            by_type,
            avg_response_secs,
        }
    }
}

/// Most recent first.
pub fn sorted_recent_first(records: &[CueStatistic]) -> Vec<&CueStatistic> {
    let mut out: Vec<_> = records.iter().collect();
    out.sort_by(|a, b| b.shown_at.cmp(&a.shown_at));
    out
}
