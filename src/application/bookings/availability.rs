//! Availability oracle
//!
//! Read-only view of whether a spot is free for a window. Creation and
//! confirmation re-run the same predicate inside the store's per-spot lock;
//! answers from here are advisory.

use std::sync::Arc;

use crate::domain::booking::TimeWindow;
use crate::domain::{BookingId, DomainResult, RepositoryProvider, SpotId};

pub struct AvailabilityOracle {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityOracle {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// True when no confirmed or active booking on `spot_id` overlaps
    /// `window`, ignoring `exclude`.
    pub async fn is_available(
        &self,
        spot_id: SpotId,
        window: &TimeWindow,
        exclude: Option<BookingId>,
    ) -> DomainResult<bool> {
        Ok(self.conflicts(spot_id, window, exclude).await?.is_empty())
    }

    /// Windows of the bookings that block `window`, earliest first.
    pub async fn conflicts(
        &self,
        spot_id: SpotId,
        window: &TimeWindow,
        exclude: Option<BookingId>,
    ) -> DomainResult<Vec<TimeWindow>> {
        let mut windows: Vec<TimeWindow> = self
            .repos
            .bookings()
            .find_blocking(spot_id, window, exclude)
            .await?
            .iter()
            .map(|b| b.window())
            .collect();
        windows.sort_by_key(|w| w.start);
        Ok(windows)
    }
}
