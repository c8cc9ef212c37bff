//! Parking spot collaborator
//!
//! Spot listings are owned by another subsystem. The booking engine only
//! reads the fields it needs through [`SpotLookup`].

use async_trait::async_trait;
use chrono::Weekday;
use rust_decimal::Decimal;
use thiserror::Error;

use super::error::{DomainError, DomainResult, ValidationReason};
use super::{SpotId, UserId};

/// Minutes in a full day; `closes_at` may equal this to mean "until midnight".
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Recurring weekly operating hours of a spot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatingSchedule {
    /// Opening time, minutes since midnight
    pub opens_at: u32,
    /// Closing time, minutes since midnight
    pub closes_at: u32,
    /// Operating days; empty means every day
    pub days: Vec<Weekday>,
}

impl OperatingSchedule {
    pub fn new(opens_at: u32, closes_at: u32, days: Vec<Weekday>) -> Self {
        Self {
            opens_at,
            closes_at,
            days,
        }
    }

    /// Open around the clock, every day.
    pub fn always() -> Self {
        Self::new(0, MINUTES_PER_DAY, Vec::new())
    }

    /// Parse `"HH:MM"` bounds and weekday names (`"monday"`, `"Mon"`, ...).
    pub fn parse<S: AsRef<str>>(opens_at: &str, closes_at: &str, days: &[S]) -> DomainResult<Self> {
        let opens_at = parse_clock(opens_at)?;
        let closes_at = parse_clock(closes_at)?;
        if closes_at <= opens_at {
            return Err(invalid_schedule());
        }

        let mut parsed = Vec::with_capacity(days.len());
        for day in days {
            let day = parse_weekday(day.as_ref())?;
            if !parsed.contains(&day) {
                parsed.push(day);
            }
        }

        Ok(Self::new(opens_at, closes_at, parsed))
    }

    pub fn is_open_on(&self, day: Weekday) -> bool {
        self.days.is_empty() || self.days.contains(&day)
    }

    /// Comma-separated lowercase day names, the inverse of [`parse`](Self::parse).
    pub fn days_to_string(&self) -> String {
        self.days
            .iter()
            .map(|d| weekday_name(*d))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn format_clock(minutes: u32) -> String {
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

impl Default for OperatingSchedule {
    fn default() -> Self {
        Self::always()
    }
}

fn invalid_schedule() -> DomainError {
    DomainError::validation("schedule", ValidationReason::InvalidSchedule)
}

fn parse_clock(raw: &str) -> DomainResult<u32> {
    let (hours, minutes) = raw.trim().split_once(':').ok_or_else(invalid_schedule)?;
    let hours: u32 = hours.parse().map_err(|_| invalid_schedule())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid_schedule())?;

    if minutes >= 60 || hours > 24 || (hours == 24 && minutes != 0) {
        return Err(invalid_schedule());
    }
    Ok(hours * 60 + minutes)
}

fn parse_weekday(raw: &str) -> DomainResult<Weekday> {
    let day = match raw.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tuesday" => Weekday::Tue,
        "wed" | "wednesday" => Weekday::Wed,
        "thu" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return Err(invalid_schedule()),
    };
    Ok(day)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// What the booking engine needs to know about a spot.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotDetails {
    pub id: SpotId,
    pub owner_id: UserId,
    pub title: String,
    pub hourly_rate: Decimal,
    pub active: bool,
    pub schedule: OperatingSchedule,
}

/// Failure of a neighbouring subsystem. Never retried here.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("timed out after {0} ms")]
    Timeout(u64),
    #[error("{0}")]
    Backend(String),
}

impl LookupError {
    pub fn into_domain(self, collaborator: &'static str) -> DomainError {
        DomainError::CollaboratorFailure {
            collaborator,
            message: self.to_string(),
        }
    }
}

#[async_trait]
pub trait SpotLookup: Send + Sync {
    /// Fetch a spot by ID
    async fn get_spot(&self, spot_id: SpotId) -> Result<Option<SpotDetails>, LookupError>;

    /// IDs of every spot listed by `owner_id`
    async fn spots_owned_by(&self, owner_id: UserId) -> Result<Vec<SpotId>, LookupError>;
}
