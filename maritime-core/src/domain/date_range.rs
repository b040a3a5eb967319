use std::ops::Bound;

use chrono::{DateTime, Utc};

use crate::{DateRangeError, date_range_error::OrderingSnafu};

/// A time interval where either side may be open or unbounded, used for
/// every time-range scan against storage.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRange {
    start: Bound<DateTime<Utc>>,
    end: Bound<DateTime<Utc>>,
}

impl QueryRange {
    pub fn new(
        start: Bound<DateTime<Utc>>,
        end: Bound<DateTime<Utc>>,
    ) -> Result<QueryRange, DateRangeError> {
        match (start, end) {
            (Bound::Included(start), Bound::Included(end))
            | (Bound::Included(start), Bound::Excluded(end))
            | (Bound::Excluded(start), Bound::Included(end))
            | (Bound::Excluded(start), Bound::Excluded(end)) => {
                if end < start {
                    OrderingSnafu { start, end }.fail()
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }?;

        Ok(QueryRange { start, end })
    }

    pub fn unbounded() -> QueryRange {
        QueryRange {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// `[start, end)` with either side optional.
    pub fn half_open(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<QueryRange, DateRangeError> {
        Self::new(
            start.map_or(Bound::Unbounded, Bound::Included),
            end.map_or(Bound::Unbounded, Bound::Excluded),
        )
    }

    /// `[start, end]` with either side optional.
    pub fn inclusive(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<QueryRange, DateRangeError> {
        Self::new(
            start.map_or(Bound::Unbounded, Bound::Included),
            end.map_or(Bound::Unbounded, Bound::Included),
        )
    }

    pub fn start(&self) -> Bound<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Bound<DateTime<Utc>> {
        self.end
    }

    pub fn contains(&self, val: DateTime<Utc>) -> bool {
        let after_start = match self.start {
            Bound::Included(start) => val >= start,
            Bound::Excluded(start) => val > start,
            Bound::Unbounded => true,
        };
        let before_end = match self.end {
            Bound::Included(end) => val <= end,
            Bound::Excluded(end) => val < end,
            Bound::Unbounded => true,
        };
        after_start && before_end
    }
}
