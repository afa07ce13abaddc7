use chrono::NaiveDate;
use log::warn;

use crate::error::ValidationError;

/// Inclusive analysis period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Start/end date form fields, as typed (`YYYY-MM-DD`)
#[derive(Debug, Clone, Default)]
pub struct DateRangeInput {
    pub start: String,
    pub end: String,
}

impl DateRangeInput {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateRangeInput {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Validate both dates.
    ///
    /// Ordering is left to the service: a start after the end is only
    /// logged, never rejected.
    pub fn validate(&self) -> Result<DateRange, ValidationError> {
        let start = parse_date("start_date", &self.start)?;
        let end = parse_date("end_date", &self.end)?;

        if start > end {
            warn!("Start date {} is after end date {}", start, end);
        }

        Ok(DateRange { start, end })
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingDate { field });
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        let range = DateRangeInput::new("2024-06-01", "2024-06-30")
            .validate()
            .unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn test_missing_dates() {
        let err = DateRangeInput::new("", "2024-06-30").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingDate { field: "start_date" });

        let err = DateRangeInput::new("2024-06-01", "  ").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingDate { field: "end_date" });
    }

    #[test]
    fn test_invalid_date() {
        let err = DateRangeInput::new("2024-02-30", "2024-06-30")
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidDate { field: "start_date", .. }
        ));

        let err = DateRangeInput::new("2024-06-01", "30/06/2024")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDate { field: "end_date", .. }));
    }

    #[test]
    fn test_reversed_range_is_allowed() {
        let range = DateRangeInput::new("2024-06-30", "2024-06-01")
            .validate()
            .unwrap();
        assert!(range.start > range.end);
    }
}
