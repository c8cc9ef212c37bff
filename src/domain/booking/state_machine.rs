//! Booking status transitions and who may trigger them.
//!
//! All authorisation for status changes goes through [`TRANSITIONS`]; nothing
//! else compares roles against statuses.

use chrono::{DateTime, Duration, Utc};

use super::model::{Booking, BookingStatus};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::UserId;

/// The caller's relationship to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Renter,
    SpotOwner,
}

impl Party {
    /// Resolve the caller's party; `None` when they are neither renter nor owner.
    pub fn of(caller: UserId, booking: &Booking, spot_owner: Option<UserId>) -> Option<Self> {
        if caller == booking.renter_id {
            Some(Self::Renter)
        } else if spot_owner == Some(caller) {
            Some(Self::SpotOwner)
        } else {
            None
        }
    }
}

/// Who may trigger a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    RenterOnly,
    OwnerOnly,
    EitherParty,
}

impl Trigger {
    fn allows(&self, party: Party) -> bool {
        match self {
            Self::RenterOnly => party == Party::Renter,
            Self::OwnerOnly => party == Party::SpotOwner,
            Self::EitherParty => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: BookingStatus,
    pub to: BookingStatus,
    pub trigger: Trigger,
    /// Subject to the pre-start cancellation window
    pub guarded_by_window: bool,
}

const fn rule(
    from: BookingStatus,
    to: BookingStatus,
    trigger: Trigger,
    guarded_by_window: bool,
) -> Transition {
    Transition {
        from,
        to,
        trigger,
        guarded_by_window,
    }
}

use BookingStatus::{Active, Cancelled, Completed, Confirmed, Pending};

pub const TRANSITIONS: [Transition; 6] = [
    rule(Pending, Confirmed, Trigger::OwnerOnly, false),
    rule(Pending, Cancelled, Trigger::RenterOnly, false),
    rule(Confirmed, Active, Trigger::EitherParty, false),
    rule(Confirmed, Cancelled, Trigger::EitherParty, true),
    rule(Active, Completed, Trigger::EitherParty, false),
    rule(Active, Cancelled, Trigger::EitherParty, true),
];

pub fn find_transition(from: BookingStatus, to: BookingStatus) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.to == to)
}

/// `true` when `party` may move a booking from `from` to `to`.
pub fn can_transition(party: Party, from: BookingStatus, to: BookingStatus) -> bool {
    find_transition(from, to).is_some_and(|t| t.trigger.allows(party))
}

/// Check legality first, then the party's permission.
pub fn authorize_transition(
    party: Party,
    from: BookingStatus,
    to: BookingStatus,
) -> DomainResult<&'static Transition> {
    let transition = find_transition(from, to).ok_or(DomainError::InvalidTransition { from, to })?;

    if !transition.trigger.allows(party) {
        let who = match transition.trigger {
            Trigger::RenterOnly => "the renter",
            Trigger::OwnerOnly => "the spot owner",
            Trigger::EitherParty => "a booking party",
        };
        return Err(DomainError::AccessDenied(format!(
            "only {who} can change a {from} booking to {to}"
        )));
    }

    Ok(transition)
}

/// Minimum lead time before the booking start for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancellationWindow(pub Duration);

impl Default for CancellationWindow {
    fn default() -> Self {
        Self(Duration::hours(1))
    }
}

impl CancellationWindow {
    /// Cancelling exactly at `start - window` is still allowed.
    pub fn check(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
        if start - now >= self.0 {
            Ok(())
        } else {
            Err(DomainError::CancellationWindowExpired {
                minutes: self.0.num_minutes(),
            })
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn terminal_states_have_no_exits() {
        for from in [Completed, Cancelled] {
            for to in BookingStatus::ALL {
                assert!(find_transition(from, to).is_none(), "{from} -> {to} must be illegal");
            }
        }
    }

    #[test]
    fn only_listed_transitions_are_legal() {
        let mut legal = 0;
        for from in BookingStatus::ALL {
            for to in BookingStatus::ALL {
                if find_transition(from, to).is_some() {
                    legal += 1;
                }
            }
        }
        assert_eq!(legal, TRANSITIONS.len());
        assert!(find_transition(Pending, Active).is_none());
        assert!(find_transition(Pending, Pending).is_none());
        assert!(find_transition(Confirmed, Completed).is_none());
    }

    #[test]
    fn confirm_is_owner_only() {
        assert!(can_transition(Party::SpotOwner, Pending, Confirmed));
        assert!(!can_transition(Party::Renter, Pending, Confirmed));
    }

    #[test]
    fn pending_cancel_is_renter_only() {
        assert!(can_transition(Party::Renter, Pending, Cancelled));
        assert!(!can_transition(Party::SpotOwner, Pending, Cancelled));
    }

    #[test]
    fn later_transitions_allow_either_party() {
        for (from, to) in [
            (Confirmed, Active),
            (Confirmed, Cancelled),
            (Active, Completed),
            (Active, Cancelled),
        ] {
            assert!(can_transition(Party::Renter, from, to));
            assert!(can_transition(Party::SpotOwner, from, to));
        }
    }

    #[test]
    fn renter_jumping_to_active_is_invalid_transition() {
        let err = authorize_transition(Party::Renter, Pending, Active).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition { from: Pending, to: Active }
        ));
    }

    #[test]
    fn wrong_party_is_access_denied() {
        let err = authorize_transition(Party::Renter, Pending, Confirmed).unwrap_err();
        assert!(matches!(err, DomainError::AccessDenied(_)));
    }

    #[test]
    fn window_guard_marks_late_cancellations() {
        assert!(find_transition(Confirmed, Cancelled).unwrap().guarded_by_window);
        assert!(find_transition(Active, Cancelled).unwrap().guarded_by_window);
        assert!(!find_transition(Pending, Cancelled).unwrap().guarded_by_window);
    }

    #[test]
    fn cancellation_window_boundary() {
        let start = Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap();
        let window = CancellationWindow::default();

        assert!(window.check(start, start - Duration::hours(1)).is_ok());
        assert!(matches!(
            window.check(start, start - Duration::minutes(59)),
            Err(DomainError::CancellationWindowExpired { minutes: 60 })
        ));
    }
}
