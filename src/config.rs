//! Configuration of one extraction batch.

use crate::plan::TableRef;
use crate::staging::StagingLocation;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration of one extraction batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Stamped into every row's `r_source`.
    pub source: String,
    /// Table the staged batch was extracted from; recorded in the plan.
    pub extract_schema: String,
    pub extract_table: String,
    pub staging_schema: String,
    /// Base name of the staging table; the batch timestamp is appended.
    pub staging_table: String,
    /// Start of the extraction; the default `r_timestamp` of every staged row.
    pub extract_start_timestamp: DateTime<Utc>,
    /// `r_timestamp_end` value that marks a satellite record as open.
    pub open_end_timestamp: NaiveDateTime,
    /// Generate operations for independent tables on the rayon pool.
    pub parallel: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            extract_schema: String::new(),
            extract_table: String::new(),
            staging_schema: String::new(),
            staging_table: String::new(),
            extract_start_timestamp: DateTime::<Utc>::default(),
            open_end_timestamp: end_of_time(),
            parallel: true,
        }
    }
}

impl LoadConfig {
    /// The batch staging location: `<staging_table>_<YYYYMMDD_HHMMSS>`.
    pub fn staging_location(&self) -> StagingLocation {
        StagingLocation::new(
            self.staging_schema.clone(),
            format!(
                "{}_{}",
                self.staging_table,
                self.extract_start_timestamp.format("%Y%m%d_%H%M%S")
            ),
        )
    }

    /// The extraction source table, as recorded in the plan header.
    pub fn extract_location(&self) -> TableRef {
        TableRef { schema: self.extract_schema.clone(), name: self.extract_table.clone() }
    }

    /// `extract_start_timestamp` as stored in timezone-less record columns.
    pub fn record_timestamp(&self) -> NaiveDateTime {
        self.extract_start_timestamp.naive_utc()
    }
}

/// 9999-12-31 00:00:00.
pub fn end_of_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MAX)
}
