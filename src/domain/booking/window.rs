//! Booking time windows and the rules a requested window must satisfy.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

use crate::domain::error::{DomainError, DomainResult, ValidationReason};
use crate::domain::spot::OperatingSchedule;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Parse both bounds from RFC 3339 strings.
    pub fn parse(start: &str, end: &str) -> DomainResult<Self> {
        let start = parse_instant("start_time", start)?;
        let end = parse_instant("end_time", end)?;
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Half-open overlap test. Windows that only touch (`a.end == b.start`)
    /// do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

fn parse_instant(field: &'static str, raw: &str) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation(field, ValidationReason::MissingField));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DomainError::validation(field, ValidationReason::InvalidTimestamp))
}

/// Absolute duration bounds for any booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRules {
    pub min_duration: Duration,
    pub max_duration: Duration,
}

impl Default for WindowRules {
    fn default() -> Self {
        Self {
            min_duration: Duration::minutes(30),
            max_duration: Duration::hours(168),
        }
    }
}

/// Check a window against the absolute rules, first failure wins:
/// future start, end after start, then the duration bounds (inclusive).
pub fn validate_window(
    window: &TimeWindow,
    now: DateTime<Utc>,
    rules: &WindowRules,
) -> DomainResult<()> {
    if window.start <= now {
        return Err(DomainError::validation(
            "start_time",
            ValidationReason::StartNotInFuture,
        ));
    }
    if window.end <= window.start {
        return Err(DomainError::validation(
            "end_time",
            ValidationReason::EndNotAfterStart,
        ));
    }

    let duration = window.duration();
    if duration < rules.min_duration {
        return Err(DomainError::validation(
            "end_time",
            ValidationReason::DurationTooShort,
        ));
    }
    if duration > rules.max_duration {
        return Err(DomainError::validation(
            "end_time",
            ValidationReason::DurationTooLong,
        ));
    }

    Ok(())
}

/// Check a window against a spot's recurring weekly schedule.
///
/// Both the start and end weekday must be operating days (an empty day set
/// means every day). Time of day is compared as minutes since midnight:
/// the start must not precede opening and the end must not pass closing.
pub fn validate_against_schedule(
    window: &TimeWindow,
    schedule: &OperatingSchedule,
) -> DomainResult<()> {
    if !schedule.is_open_on(window.start.weekday()) || !schedule.is_open_on(window.end.weekday())
    {
        return Err(DomainError::validation(
            "start_time",
            ValidationReason::OutsideOperatingDays,
        ));
    }

    if minutes_since_midnight(&window.start) < schedule.opens_at {
        return Err(DomainError::validation(
            "start_time",
            ValidationReason::OutsideOperatingHours,
        ));
    }
    if minutes_since_midnight(&window.end) > schedule.closes_at {
        return Err(DomainError::validation(
            "end_time",
            ValidationReason::OutsideOperatingHours,
        ));
    }

    Ok(())
}

fn minutes_since_midnight(instant: &DateTime<Utc>) -> u32 {
    instant.hour() * 60 + instant.minute()
}

// ── Tests ──────────────────────────────────────────────────────
