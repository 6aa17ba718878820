//! Tests for the booking ledger service.

use std::collections::HashMap;
use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    BookingRepositoryError, CarRepositoryError, MockBookingRepository, MockCarRepository,
    MockNotificationDispatcher, MockReceiptRenderer, MockUserRepository, NotificationError,
};
use crate::domain::test_fixtures::{booking_of, car_hosted_by, fixture_clock, host, june, now, renter};

fn users_repo(known: &[&User]) -> MockUserRepository {
    let by_id: HashMap<UserId, User> = known
        .iter()
        .map(|user| (user.id(), (*user).clone()))
        .collect();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(by_id.get(id).cloned()));
    repo
}

fn cars_repo(known: &[&Car]) -> MockCarRepository {
    let by_id: HashMap<CarId, Car> = known.iter().map(|car| (car.id, (*car).clone())).collect();
    let mut repo = MockCarRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(by_id.get(id).cloned()));
    repo
}

fn quiet_notifier() -> MockNotificationDispatcher {
    let mut notifier = MockNotificationDispatcher::new();
    notifier.expect_dispatch().returning(|_| Ok(()));
    notifier
}

fn service(
    bookings: MockBookingRepository,
    cars: MockCarRepository,
    users: MockUserRepository,
    notifier: MockNotificationDispatcher,
) -> BookingService<MockBookingRepository, MockCarRepository, MockUserRepository> {
    BookingService::new(
        Arc::new(bookings),
        Arc::new(cars),
        Arc::new(users),
        Arc::new(MockReceiptRenderer::new()),
        Arc::new(notifier),
        fixture_clock(),
    )
}

fn request_for(actor: &User, car: &Car, (start, end): (u32, u32)) -> CreateBookingRequest {
    CreateBookingRequest {
        actor: actor.id(),
        car_id: car.id,
        start_date: june(start),
        end_date: june(end),
        total_amount: 225.0,
        driver_license: "D1234567".to_owned(),
        additional_notes: None,
    }
}

#[tokio::test]
async fn create_booking_confirms_and_snapshots_the_car() {
    let renter = renter();
    let host = host();
    let car = car_hosted_by(&host);

    let mut bookings = MockBookingRepository::new();
    bookings.expect_list_for_car().times(1).return_once(|_| Ok(Vec::new()));
    bookings
        .expect_insert_if_available()
        .times(1)
        .return_once(|_| Ok(()));

    let mut notifier = MockNotificationDispatcher::new();
    let renter_email = renter.email().clone();
    notifier
        .expect_dispatch()
        .withf(move |notification| {
            notification.recipient.email == renter_email
                && matches!(
                    &notification.kind,
                    NotificationKind::BookingConfirmed(snapshot)
                        if snapshot.car_make == "Toyota" && snapshot.location == "Lisbon"
                )
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter]), notifier);
    let booking = service
        .create_booking(request_for(&renter, &car, (1, 5)))
        .await
        .expect("booking accepted");

    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.host_id, host.id());
    assert_eq!(booking.user_id, renter.id());
    assert_eq!(booking.created_at, now());
}

#[tokio::test]
async fn hosts_cannot_book() {
    let host = host();
    let car = car_hosted_by(&host);

    let mut bookings = MockBookingRepository::new();
    bookings.expect_insert_if_available().times(0);

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&host]), quiet_notifier());
    let error = service
        .create_booking(request_for(&host, &car, (1, 5)))
        .await
        .expect_err("hosts are refused");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case::flagged_unavailable(true)]
#[case::never_existed(false)]
#[tokio::test]
async fn unavailable_and_missing_cars_are_indistinguishable(#[case] car_exists: bool) {
    let renter = renter();
    let mut car = car_hosted_by(&host());
    car.is_available = false;
    let known: Vec<&Car> = if car_exists { vec![&car] } else { Vec::new() };

    let mut bookings = MockBookingRepository::new();
    bookings.expect_list_for_car().times(0);
    bookings.expect_insert_if_available().times(0);

    let service = service(bookings, cars_repo(&known), users_repo(&[&renter]), quiet_notifier());
    let error = service
        .create_booking(request_for(&renter, &car, (1, 5)))
        .await
        .expect_err("car unavailable");

    assert_eq!(error.code(), ErrorCode::CarUnavailable);
}

#[tokio::test]
async fn overlapping_request_is_rejected_with_every_conflict() {
    let renter = renter();
    let car = car_hosted_by(&host());
    let first = booking_of(&car, &renter, (1, 5), BookingStatus::Confirmed);
    let second = booking_of(&car, &renter, (8, 9), BookingStatus::Pending);
    let cancelled = booking_of(&car, &renter, (4, 6), BookingStatus::Cancelled);
    let expected = vec![first.id, second.id];

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_list_for_car()
        .times(1)
        .return_once(move |_| Ok(vec![first, second, cancelled]));
    bookings.expect_insert_if_available().times(0);

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter]), quiet_notifier());
    let error = service
        .create_booking(request_for(&renter, &car, (4, 10)))
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    let details = error.details().expect("conflict details");
    assert_eq!(details["code"], "booking_conflict");
    assert_eq!(
        details["conflictingBookingIds"],
        serde_json::to_value(expected).expect("serialise ids")
    );
}

#[tokio::test]
async fn conflict_detected_at_insert_time_is_reported_as_conflict() {
    let renter = renter();
    let car = car_hosted_by(&host());

    let mut bookings = MockBookingRepository::new();
    bookings.expect_list_for_car().return_once(|_| Ok(Vec::new()));
    bookings
        .expect_insert_if_available()
        .times(1)
        .return_once(|_| Err(BookingRepositoryError::conflict(vec![BookingId::random()])));

    let mut notifier = MockNotificationDispatcher::new();
    notifier.expect_dispatch().times(0);

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter]), notifier);
    let error = service
        .create_booking(request_for(&renter, &car, (1, 5)))
        .await
        .expect_err("lost the race");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn store_failure_during_scan_aborts_creation() {
    let renter = renter();
    let car = car_hosted_by(&host());

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_list_for_car()
        .return_once(|_| Err(BookingRepositoryError::connection("pool exhausted")));
    bookings.expect_insert_if_available().times(0);

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter]), quiet_notifier());
    let error = service
        .create_booking(request_for(&renter, &car, (1, 5)))
        .await
        .expect_err("store failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn notification_failure_does_not_undo_the_booking() {
    let renter = renter();
    let car = car_hosted_by(&host());

    let mut bookings = MockBookingRepository::new();
    bookings.expect_list_for_car().return_once(|_| Ok(Vec::new()));
    bookings.expect_insert_if_available().return_once(|_| Ok(()));

    let mut notifier = MockNotificationDispatcher::new();
    notifier
        .expect_dispatch()
        .times(1)
        .return_once(|_| Err(NotificationError::delivery("smtp down")));

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter]), notifier);
    let booking = service
        .create_booking(request_for(&renter, &car, (1, 5)))
        .await
        .expect("booking kept");
    assert_eq!(booking.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn inverted_period_is_an_invalid_request() {
    let renter = renter();
    let car = car_hosted_by(&host());

    let service = service(
        MockBookingRepository::new(),
        cars_repo(&[&car]),
        users_repo(&[&renter]),
        quiet_notifier(),
    );
    let error = service
        .create_booking(request_for(&renter, &car, (5, 1)))
        .await
        .expect_err("inverted range");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], "endDate");
}

fn stored_booking(booking: Booking) -> MockBookingRepository {
    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_find_by_id()
        .returning(move |_| Ok(Some(booking.clone())));
    bookings
}

#[tokio::test]
async fn host_completing_an_active_booking_thanks_the_renter() {
    let renter = renter();
    let host = host();
    let car = car_hosted_by(&host);
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Active);
    let booking_id = booking.id;

    let mut bookings = stored_booking(booking);
    bookings
        .expect_transition_status()
        .withf(|_, expected, next| {
            *expected == BookingStatus::Active && *next == BookingStatus::Completed
        })
        .times(1)
        .return_once(|_, _, _| Ok(true));

    let mut notifier = MockNotificationDispatcher::new();
    let renter_email = renter.email().clone();
    notifier
        .expect_dispatch()
        .withf(move |notification| {
            notification.recipient.email == renter_email
                && matches!(
                    &notification.kind,
                    NotificationKind::BookingCompleted(summary)
                        if summary.make == "Toyota" && summary.model == "Corolla"
                )
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter, &host]), notifier);
    service
        .update_status(UpdateBookingStatusRequest {
            actor: host.id(),
            booking_id,
            status: BookingStatus::Completed,
        })
        .await
        .expect("transition accepted");
}

#[tokio::test]
async fn completion_stands_when_the_thank_you_lookup_fails() {
    let renter = renter();
    let host = host();
    let car = car_hosted_by(&host);
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Active);
    let booking_id = booking.id;

    let mut bookings = stored_booking(booking);
    bookings
        .expect_transition_status()
        .times(1)
        .return_once(|_, _, _| Ok(true));
    let mut cars = MockCarRepository::new();
    cars.expect_find_by_id()
        .returning(|_| Err(CarRepositoryError::connection("db blip")));
    let mut notifier = MockNotificationDispatcher::new();
    notifier.expect_dispatch().times(0);

    let service = service(bookings, cars, users_repo(&[&renter, &host]), notifier);
    service
        .update_status(UpdateBookingStatusRequest {
            actor: host.id(),
            booking_id,
            status: BookingStatus::Completed,
        })
        .await
        .expect("committed transition reported as success");
}

#[rstest]
#[case(BookingStatus::Pending)]
#[case(BookingStatus::Confirmed)]
#[case(BookingStatus::Active)]
#[case(BookingStatus::Completed)]
#[tokio::test]
async fn renter_setting_confirmed_is_forbidden(#[case] from: BookingStatus) {
    let renter = renter();
    let car = car_hosted_by(&host());
    let booking = booking_of(&car, &renter, (1, 5), from);
    let booking_id = booking.id;

    let mut bookings = stored_booking(booking);
    bookings.expect_transition_status().times(0);

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter]), quiet_notifier());
    let error = service
        .update_status(UpdateBookingStatusRequest {
            actor: renter.id(),
            booking_id,
            status: BookingStatus::Confirmed,
        })
        .await
        .expect_err("renters may only cancel");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn another_hosts_update_is_forbidden() {
    let renter = renter();
    let car = car_hosted_by(&host());
    let stranger = crate::domain::test_fixtures::user(Role::Host, "sam@example.com", "Sam");
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Confirmed);
    let booking_id = booking.id;

    let service = service(
        stored_booking(booking),
        cars_repo(&[&car]),
        users_repo(&[&stranger]),
        quiet_notifier(),
    );
    let error = service
        .update_status(UpdateBookingStatusRequest {
            actor: stranger.id(),
            booking_id,
            status: BookingStatus::Active,
        })
        .await
        .expect_err("foreign host");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn illegal_transition_by_owner_is_invalid() {
    let renter = renter();
    let host = host();
    let car = car_hosted_by(&host);
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Pending);
    let booking_id = booking.id;

    let service = service(
        stored_booking(booking),
        cars_repo(&[&car]),
        users_repo(&[&host]),
        quiet_notifier(),
    );
    let error = service
        .update_status(UpdateBookingStatusRequest {
            actor: host.id(),
            booking_id,
            status: BookingStatus::Completed,
        })
        .await
        .expect_err("pending cannot complete");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["code"], "invalid_transition");
}

#[tokio::test]
async fn missing_booking_is_not_found() {
    let host = host();
    let mut bookings = MockBookingRepository::new();
    bookings.expect_find_by_id().return_once(|_| Ok(None));

    let service = service(
        bookings,
        MockCarRepository::new(),
        users_repo(&[&host]),
        quiet_notifier(),
    );
    let error = service
        .update_status(UpdateBookingStatusRequest {
            actor: host.id(),
            booking_id: BookingId::random(),
            status: BookingStatus::Cancelled,
        })
        .await
        .expect_err("not found");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn stale_status_is_reported_as_conflict() {
    let renter = renter();
    let car = car_hosted_by(&host());
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Confirmed);
    let booking_id = booking.id;

    let mut bookings = stored_booking(booking);
    bookings
        .expect_transition_status()
        .return_once(|_, _, _| Ok(false));

    let service = service(bookings, cars_repo(&[&car]), users_repo(&[&renter]), quiet_notifier());
    let error = service
        .update_status(UpdateBookingStatusRequest {
            actor: renter.id(),
            booking_id,
            status: BookingStatus::Cancelled,
        })
        .await
        .expect_err("status moved underneath");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn unverified_users_are_turned_away() {
    let renter = renter().apply(&crate::domain::UserUpdate {
        verified: Some(false),
        ..Default::default()
    });
    let car = car_hosted_by(&host());

    let service = service(
        MockBookingRepository::new(),
        cars_repo(&[&car]),
        users_repo(&[&renter]),
        quiet_notifier(),
    );
    let error = service
        .create_booking(request_for(&renter, &car, (1, 5)))
        .await
        .expect_err("unverified");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn host_listing_shows_renter_contact_with_email() {
    let renter = renter();
    let host = host();
    let car = car_hosted_by(&host);
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Confirmed);

    let mut bookings = MockBookingRepository::new();
    let host_id = host.id();
    bookings
        .expect_list_for_host()
        .withf(move |id| *id == host_id)
        .return_once(move |_| Ok(vec![booking]));

    let service = service(
        bookings,
        cars_repo(&[&car]),
        users_repo(&[&renter, &host]),
        quiet_notifier(),
    );
    let listings = service
        .list_bookings(ListBookingsRequest { actor: host.id() })
        .await
        .expect("listing");

    let [listing] = listings.as_slice() else {
        panic!("expected one listing, got {}", listings.len());
    };
    let contact = listing.user.as_ref().expect("renter contact");
    assert_eq!(contact.email.as_deref(), Some("rita@example.com"));
    assert!(listing.host.is_none());
    assert_eq!(listing.car.as_ref().map(|car| car.make.as_str()), Some("Toyota"));
}

#[tokio::test]
async fn renter_listing_shows_host_contact_without_email() {
    let renter = renter();
    let host = host();
    let car = car_hosted_by(&host);
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Completed);

    let mut bookings = MockBookingRepository::new();
    bookings
        .expect_list_for_renter()
        .return_once(move |_| Ok(vec![booking]));

    let service = service(
        bookings,
        cars_repo(&[&car]),
        users_repo(&[&renter, &host]),
        quiet_notifier(),
    );
    let listings = service
        .list_bookings(ListBookingsRequest { actor: renter.id() })
        .await
        .expect("listing");

    let contact = listings[0].host.as_ref().expect("host contact");
    assert_eq!(contact.name, "Hugo Host");
    assert!(contact.email.is_none());
}

fn receipt_service(
    booking: Booking,
    car: &Car,
    users: &[&User],
) -> BookingService<MockBookingRepository, MockCarRepository, MockUserRepository> {
    let mut receipts = MockReceiptRenderer::new();
    receipts.expect_extension().return_const("pdf");
    receipts
        .expect_content_type()
        .return_const("application/pdf");
    receipts
        .expect_render()
        .returning(|_| Ok(b"%PDF-1.4".to_vec()));
    BookingService::new(
        Arc::new(stored_booking(booking)),
        Arc::new(cars_repo(&[car])),
        Arc::new(users_repo(users)),
        Arc::new(receipts),
        Arc::new(quiet_notifier()),
        fixture_clock(),
    )
}

#[tokio::test]
async fn renter_downloads_receipt_named_after_booking() {
    let renter = renter();
    let car = car_hosted_by(&host());
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Completed);
    let booking_id = booking.id;

    let service = receipt_service(booking, &car, &[&renter]);
    let document = service
        .booking_receipt(BookingReceiptRequest {
            actor: renter.id(),
            booking_id,
        })
        .await
        .expect("receipt");

    assert_eq!(document.filename, format!("receipt_{booking_id}.pdf"));
    assert_eq!(document.content_type, "application/pdf");
    assert!(document.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn host_cannot_download_renter_receipt() {
    let renter = renter();
    let host = host();
    let car = car_hosted_by(&host);
    let booking = booking_of(&car, &renter, (1, 5), BookingStatus::Completed);
    let booking_id = booking.id;

    let service = receipt_service(booking, &car, &[&renter, &host]);
    let error = service
        .booking_receipt(BookingReceiptRequest {
            actor: host.id(),
            booking_id,
        })
        .await
        .expect_err("host refused");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}
