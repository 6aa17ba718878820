//! Tests for booking periods, terms and the conflict scan.

use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

use super::*;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0)
        .single()
        .expect("valid fixture date")
}

fn range(start: u32, end: u32) -> DateRange {
    DateRange::new(day(start), day(end)).expect("valid range")
}

fn booking(period: DateRange, status: BookingStatus) -> Booking {
    Booking {
        id: BookingId::random(),
        user_id: UserId::random(),
        car_id: CarId::random(),
        host_id: UserId::random(),
        period,
        terms: BookingTerms::new(100.0, "D1234567", None).expect("valid terms"),
        status,
        created_at: day(1),
    }
}

#[fixture]
fn confirmed_first_week() -> Booking {
    booking(range(1, 5), BookingStatus::Confirmed)
}

#[rstest]
#[case(range(1, 5), range(4, 10), true)]
#[case(range(1, 5), range(5, 10), true)]
#[case(range(1, 5), range(6, 10), false)]
#[case(range(3, 4), range(1, 10), true)]
#[case(range(7, 7), range(7, 7), true)]
#[case(range(10, 12), range(1, 9), false)]
fn overlap_is_closed_and_symmetric(
    #[case] left: DateRange,
    #[case] right: DateRange,
    #[case] expected: bool,
) {
    assert_eq!(left.overlaps(&right), expected);
    assert_eq!(right.overlaps(&left), expected);
}

#[rstest]
fn end_before_start_is_rejected() {
    let err = DateRange::new(day(5), day(1)).expect_err("inverted range");
    assert!(matches!(err, BookingValidationError::EndBeforeStart { .. }));
}

#[rstest]
#[case(range(1, 5), 5)]
#[case(range(3, 3), 1)]
fn rental_days_count_both_ends(#[case] period: DateRange, #[case] expected: i64) {
    assert_eq!(period.rental_days(), expected);
}

#[rstest]
fn partial_days_round_down_before_adding_the_first_day() {
    let period = DateRange::new(day(1), day(1) + Duration::hours(30)).expect("valid range");
    assert_eq!(period.rental_days(), 2);
}

#[rstest]
fn scenario_a_overlapping_request_conflicts(confirmed_first_week: Booking) {
    let existing = [confirmed_first_week.clone()];

    assert_eq!(
        conflicting_bookings(&range(4, 10), &existing),
        vec![confirmed_first_week.id]
    );
    assert!(conflicting_bookings(&range(6, 10), &existing).is_empty());
}

#[rstest]
#[case(BookingStatus::Pending, true)]
#[case(BookingStatus::Confirmed, true)]
#[case(BookingStatus::Active, true)]
#[case(BookingStatus::Completed, false)]
#[case(BookingStatus::Cancelled, false)]
fn only_non_terminal_bookings_block(#[case] status: BookingStatus, #[case] blocks: bool) {
    let existing = [booking(range(1, 5), status)];
    assert_eq!(!conflicting_bookings(&range(2, 3), &existing).is_empty(), blocks);
}

#[rstest]
fn scan_reports_every_conflict() {
    let existing = [
        booking(range(1, 3), BookingStatus::Confirmed),
        booking(range(8, 9), BookingStatus::Active),
        booking(range(5, 6), BookingStatus::Cancelled),
        booking(range(10, 12), BookingStatus::Pending),
    ];
    let conflicts = conflicting_bookings(&range(2, 10), &existing);
    assert_eq!(conflicts.len(), 3);
}

#[rstest]
#[case(-1.0)]
#[case(f64::INFINITY)]
fn terms_reject_invalid_amounts(#[case] amount: f64) {
    let err = BookingTerms::new(amount, "D1", None).expect_err("invalid amount");
    assert!(matches!(err, BookingValidationError::InvalidAmount { .. }));
}

#[rstest]
fn terms_drop_blank_notes_and_require_licence() {
    let terms = BookingTerms::new(0.0, " D1 ", Some("  ".to_owned())).expect("valid terms");
    assert_eq!(terms.driver_license(), "D1");
    assert!(terms.additional_notes().is_none());

    assert_eq!(
        BookingTerms::new(10.0, "  ", None),
        Err(BookingValidationError::MissingDriverLicense)
    );
}

#[rstest]
#[case("pending", BookingStatus::Pending)]
#[case("cancelled", BookingStatus::Cancelled)]
fn statuses_parse_from_wire_names(#[case] raw: &str, #[case] expected: BookingStatus) {
    assert_eq!(raw.parse::<BookingStatus>(), Ok(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn unknown_status_is_rejected() {
    assert!("archived".parse::<BookingStatus>().is_err());
}

mod properties {
    use proptest::prelude::*;

    use super::*;

    fn interval_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..28, 0u32..6).prop_map(|(start, len)| (start, (start + len).min(30)))
    }

    proptest! {
        #[test]
        fn accepted_bookings_never_overlap(intervals in prop::collection::vec(interval_strategy(), 1..40)) {
            let mut accepted: Vec<Booking> = Vec::new();
            let mut rejected: Vec<DateRange> = Vec::new();

            for (start, end) in intervals {
                let candidate = range(start, end);
                if conflicting_bookings(&candidate, &accepted).is_empty() {
                    accepted.push(booking(candidate, BookingStatus::Confirmed));
                } else {
                    rejected.push(candidate);
                }
            }

            for (index, left) in accepted.iter().enumerate() {
                for right in accepted.iter().skip(index + 1) {
                    prop_assert!(!left.period.overlaps(&right.period));
                }
            }
            for candidate in &rejected {
                prop_assert!(accepted.iter().any(|booking| booking.period.overlaps(candidate)));
                prop_assert!(!conflicting_bookings(candidate, &accepted).is_empty());
            }
        }

        #[test]
        fn terminal_bookings_never_conflict(
            (start, end) in interval_strategy(),
            cancelled in prop::bool::ANY,
        ) {
            let status = if cancelled { BookingStatus::Cancelled } else { BookingStatus::Completed };
            let existing = [booking(range(start, end), status)];
            prop_assert!(conflicting_bookings(&range(start, end), &existing).is_empty());
        }
    }
}
