//! The signed-in student's own evaluations.
//!
//! Two read-only lists with fixed orderings: evaluations needing
//! reinforcement oldest first, full history newest first. Both sorts are
//! stable so equal dates keep server order, and undated rows go last.

use std::cmp::Ordering;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::api::types::{HistoryEntry, RemedialEvaluation};
use crate::api::ApiError;
use crate::resource::ResourceStatus;

/// Effect of feeding a records answer back.
#[derive(Debug)]
pub enum RecordsApplied {
    Stale,
    Loaded(usize),
    Failed(ApiError),
}

fn oldest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn newest_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        _ => oldest_first(a, b),
    }
}

/// Sort reinforcement entries by date ascending.
pub fn sort_remedial(entries: &mut [RemedialEvaluation]) {
    entries.sort_by(|a, b| oldest_first(a.date(), b.date()));
}

/// Sort history entries by date descending.
pub fn sort_history(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| newest_first(a.date(), b.date()));
}

#[derive(Debug, Default)]
pub struct StudentRecords {
    remedial: Vec<RemedialEvaluation>,
    remedial_status: ResourceStatus,
    history: Vec<HistoryEntry>,
    history_status: ResourceStatus,
    epoch: u64,
}

impl StudentRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remedial(&self) -> &[RemedialEvaluation] {
        &self.remedial
    }

    pub fn remedial_status(&self) -> ResourceStatus {
        self.remedial_status
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn history_status(&self) -> ResourceStatus {
        self.history_status
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn begin_remedial(&mut self) -> u64 {
        self.remedial_status = ResourceStatus::Loading;
        self.epoch
    }

    pub fn begin_history(&mut self) -> u64 {
        self.history_status = ResourceStatus::Loading;
        self.epoch
    }

    pub fn apply_remedial(
        &mut self,
        epoch: u64,
        result: Result<Vec<RemedialEvaluation>, ApiError>,
    ) -> RecordsApplied {
        if epoch != self.epoch {
            debug!("Dropping stale remedial summary");
            return RecordsApplied::Stale;
        }
        match result {
            Ok(mut entries) => {
                sort_remedial(&mut entries);
                let count = entries.len();
                self.remedial = entries;
                self.remedial_status = ResourceStatus::Loaded;
                RecordsApplied::Loaded(count)
            }
            Err(e) => {
                warn!(error = %e, "Remedial summary failed");
                self.remedial_status = ResourceStatus::Errored;
                RecordsApplied::Failed(e)
            }
        }
    }

    pub fn apply_history(&mut self, epoch: u64, result: Result<Vec<HistoryEntry>, ApiError>) -> RecordsApplied {
        if epoch != self.epoch {
            debug!("Dropping stale history");
            return RecordsApplied::Stale;
        }
        match result {
            Ok(mut entries) => {
                sort_history(&mut entries);
                let count = entries.len();
                self.history = entries;
                self.history_status = ResourceStatus::Loaded;
                RecordsApplied::Loaded(count)
            }
            Err(e) => {
                warn!(error = %e, "History failed");
                self.history_status = ResourceStatus::Errored;
                RecordsApplied::Failed(e)
            }
        }
    }

    /// Invalidate in-flight loads; keeps what is cached.
    pub fn unmount(&mut self) {
        self.epoch += 1;
        for status in [&mut self.remedial_status, &mut self.history_status] {
            if *status == ResourceStatus::Loading {
                *status = ResourceStatus::Idle;
            }
        }
    }

    /// Forget everything; used when the session ends.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.remedial.clear();
        self.history.clear();
        self.remedial_status = ResourceStatus::Idle;
        self.history_status = ResourceStatus::Idle;
    }
}
