//! Booking status transition table.
//!
//! A transition is legal only when `(from, role, to)` is listed here. The
//! actor must additionally be the booking's host (host role) or renter
//! (renter role).

use super::{Booking, BookingStatus, Role, User};

use BookingStatus::{Active, Cancelled, Completed, Confirmed, Pending};

const LEGAL_TRANSITIONS: &[(BookingStatus, Role, BookingStatus)] = &[
    (Pending, Role::Host, Confirmed),
    (Pending, Role::Host, Cancelled),
    (Confirmed, Role::Host, Active),
    (Confirmed, Role::Host, Cancelled),
    (Active, Role::Host, Completed),
    (Active, Role::Host, Cancelled),
    (Pending, Role::Renter, Cancelled),
    (Confirmed, Role::Renter, Cancelled),
    (Active, Role::Renter, Cancelled),
];

/// Reasons a status change is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// A host tried to change a booking on someone else's car.
    #[error("only the host of this booking can update its status")]
    NotBookingHost,
    /// A renter tried to change someone else's booking.
    #[error("only the renter who made this booking can cancel it")]
    NotBookingRenter,
    /// A renter asked for anything other than cancellation.
    #[error("renters can only cancel bookings")]
    RenterMayOnlyCancel,
    /// The actor is authorised but the move is not in the table.
    #[error("cannot move a booking from {from} to {to}")]
    Illegal {
        from: BookingStatus,
        to: BookingStatus,
    },
}

impl TransitionError {
    /// Whether the refusal concerns who is asking rather than what is asked.
    #[must_use]
    pub const fn is_permission(self) -> bool {
        !matches!(self, Self::Illegal { .. })
    }
}

/// Whether `(from, role, to)` appears in the table.
#[must_use]
pub fn is_legal(from: BookingStatus, role: Role, to: BookingStatus) -> bool {
    LEGAL_TRANSITIONS.contains(&(from, role, to))
}

/// Check ownership first, then the transition table.
///
/// # Examples
/// ```
/// use backend::domain::{BookingStatus, Role, is_legal_transition};
///
/// assert!(is_legal_transition(BookingStatus::Active, Role::Host, BookingStatus::Completed));
/// assert!(!is_legal_transition(BookingStatus::Pending, Role::Host, BookingStatus::Completed));
/// ```
pub fn authorize_transition(
    booking: &Booking,
    actor: &User,
    to: BookingStatus,
) -> Result<(), TransitionError> {
    match actor.role() {
        Role::Host if booking.host_id != actor.id() => return Err(TransitionError::NotBookingHost),
        Role::Renter if booking.user_id != actor.id() => {
            return Err(TransitionError::NotBookingRenter);
        }
        Role::Renter if to != Cancelled => return Err(TransitionError::RenterMayOnlyCancel),
        Role::Host | Role::Renter => {}
    }

    if is_legal(booking.status, actor.role(), to) {
        Ok(())
    } else {
        Err(TransitionError::Illegal {
            from: booking.status,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::{
        BookingId, BookingTerms, CarId, DateRange, EmailAddress, PersonName, UserDraft, UserId,
        UserProfile,
    };

    const ALL: [BookingStatus; 5] = [Pending, Confirmed, Active, Completed, Cancelled];

    fn user(role: Role) -> User {
        User::new(UserDraft {
            id: UserId::random(),
            email: EmailAddress::new("someone@example.com").expect("valid email"),
            name: PersonName::new("Someone").expect("valid name"),
            role,
            profile: UserProfile::default(),
            verified: true,
            created_at: Utc::now(),
        })
    }

    struct Parties {
        renter: User,
        host: User,
    }

    #[fixture]
    fn parties() -> Parties {
        Parties {
            renter: user(Role::Renter),
            host: user(Role::Host),
        }
    }

    fn booking_between(parties: &Parties, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: BookingId::random(),
            user_id: parties.renter.id(),
            car_id: CarId::random(),
            host_id: parties.host.id(),
            period: DateRange::new(now, now).expect("valid range"),
            terms: BookingTerms::new(50.0, "D1", None).expect("valid terms"),
            status,
            created_at: now,
        }
    }

    #[rstest]
    #[case(Pending, Confirmed)]
    #[case(Confirmed, Active)]
    #[case(Active, Completed)]
    #[case(Confirmed, Cancelled)]
    fn host_walks_the_documented_path(
        parties: Parties,
        #[case] from: BookingStatus,
        #[case] to: BookingStatus,
    ) {
        let booking = booking_between(&parties, from);
        assert_eq!(authorize_transition(&booking, &parties.host, to), Ok(()));
    }

    #[rstest]
    #[case(Pending, Completed)]
    #[case(Pending, Active)]
    #[case(Completed, Cancelled)]
    #[case(Cancelled, Confirmed)]
    #[case(Active, Active)]
    fn host_forward_jumps_and_terminal_exits_are_illegal(
        parties: Parties,
        #[case] from: BookingStatus,
        #[case] to: BookingStatus,
    ) {
        let booking = booking_between(&parties, from);
        assert_eq!(
            authorize_transition(&booking, &parties.host, to),
            Err(TransitionError::Illegal { from, to })
        );
    }

    #[rstest]
    fn foreign_host_is_refused(parties: Parties) {
        let booking = booking_between(&parties, Confirmed);
        let stranger = user(Role::Host);
        assert_eq!(
            authorize_transition(&booking, &stranger, Active),
            Err(TransitionError::NotBookingHost)
        );
    }

    #[rstest]
    fn renter_setting_confirmed_is_always_a_permission_error(parties: Parties) {
        for from in ALL {
            let booking = booking_between(&parties, from);
            let err = authorize_transition(&booking, &parties.renter, Confirmed)
                .expect_err("renter cannot confirm");
            assert_eq!(err, TransitionError::RenterMayOnlyCancel);
            assert!(err.is_permission());
        }
    }

    #[rstest]
    fn renter_cancels_own_non_terminal_bookings(parties: Parties) {
        for from in BookingStatus::NON_TERMINAL {
            let booking = booking_between(&parties, from);
            assert_eq!(
                authorize_transition(&booking, &parties.renter, Cancelled),
                Ok(())
            );
        }
    }

    #[rstest]
    fn renter_cannot_cancel_someone_elses_booking(parties: Parties) {
        let booking = booking_between(&parties, Confirmed);
        let other = user(Role::Renter);
        assert_eq!(
            authorize_transition(&booking, &other, Cancelled),
            Err(TransitionError::NotBookingRenter)
        );
    }

    #[rstest]
    fn table_has_no_exit_from_terminal_states() {
        for from in [Completed, Cancelled] {
            for to in ALL {
                assert!(!is_legal(from, Role::Host, to));
                assert!(!is_legal(from, Role::Renter, to));
            }
        }
    }
}
