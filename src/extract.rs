//! Single pass over the page elements.

use std::fmt;

use log::{debug, info, warn};

use crate::context::{HeadingTracker, MajorHeading};
use crate::page::{HeadingLevel, RawElement};
use crate::record::CommercialRecord;
use crate::table::{self, TableError};

/// Counts of the tables met before the scan stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub seen: usize,
    pub accepted: usize,
    /// not marked as a data table
    pub unmarked: usize,
    /// data tables with no year heading to claim
    pub without_year: usize,
    /// data tables that failed to normalize
    pub failed: usize,
}

impl TableStats {
    pub fn skipped(&self) -> usize {
        self.seen - self.accepted
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tables seen, {} accepted, {} skipped ({} unmarked, {} without year, {} failed)",
            self.seen,
            self.accepted,
            self.skipped(),
            self.unmarked,
            self.without_year,
            self.failed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFailure {
    /// position among all tables seen, from 0
    pub index: usize,
    pub year: String,
    pub error: TableError,
}

impl fmt::Display for TableFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {} ({}): {}", self.index, self.year, self.error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<CommercialRecord>,
    pub stats: TableStats,
    pub failures: Vec<TableFailure>,
}

/// No table made it through. Not a crash: there is simply nothing to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyResult {
    pub stats: TableStats,
}

impl fmt::Display for EmptyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stats.seen == 0 {
            f.write_str("no tables found")
        } else {
            write!(f, "no commercial tables accepted: {}", self.stats)
        }
    }
}

impl std::error::Error for EmptyResult {}

impl Extraction {
    pub fn into_records(self) -> Result<Vec<CommercialRecord>, EmptyResult> {
        if self.stats.accepted == 0 {
            return Err(EmptyResult { stats: self.stats });
        }
        Ok(self.records)
    }
}

/// Walks `elements` once, in order, and collects the records of every accepted table.
pub fn extract<I>(elements: I) -> Extraction
where
    I: IntoIterator<Item = RawElement>,
{
    let mut tracker = HeadingTracker::new();
    let mut out = Extraction::default();

    for el in elements {
        match &el {
            RawElement::Heading {
                level: HeadingLevel::Major,
                text,
            } => {
                if tracker.major(text) == MajorHeading::Stop {
                    break;
                }
            }
            RawElement::Heading {
                level: HeadingLevel::Minor,
                text,
            } => tracker.minor(text),
            RawElement::Table { markup, .. } => {
                let index = out.stats.seen;
                out.stats.seen += 1;
                if !el.is_data_table() {
                    out.stats.unmarked += 1;
                    continue;
                }
                let Some(context) = tracker.take_year() else {
                    out.stats.without_year += 1;
                    continue;
                };
                let year = context.year().unwrap_or_default().to_owned();
                match table::normalize(markup, &context) {
                    Ok(records) => {
                        debug!("added {} commercials for {year}", records.len());
                        out.stats.accepted += 1;
                        out.records.extend(records);
                    }
                    Err(error) => {
                        let failure = TableFailure { index, year, error };
                        warn!("skipping {failure}");
                        out.stats.failed += 1;
                        out.failures.push(failure);
                    }
                }
            }
        }
    }

    info!("{}", out.stats);
    out
}
