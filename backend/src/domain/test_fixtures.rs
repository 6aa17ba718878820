//! Builders shared by the service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    Booking, BookingId, BookingStatus, BookingTerms, Car, CarDetails, CarDetailsDraft, DateRange,
    EmailAddress, PersonName, Role, User, UserDraft, UserId, UserProfile,
};

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now: now() })
}

pub(crate) fn june(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0)
        .single()
        .expect("valid fixture date")
}

pub(crate) fn user(role: Role, email: &str, name: &str) -> User {
    User::new(UserDraft {
        id: UserId::random(),
        email: EmailAddress::new(email).expect("valid fixture email"),
        name: PersonName::new(name).expect("valid fixture name"),
        role,
        profile: UserProfile {
            phone: Some("+351 900 000 000".to_owned()),
            ..UserProfile::default()
        },
        verified: true,
        created_at: now(),
    })
}

pub(crate) fn renter() -> User {
    user(Role::Renter, "rita@example.com", "Rita Renter")
}

pub(crate) fn host() -> User {
    user(Role::Host, "hugo@example.com", "Hugo Host")
}

pub(crate) fn car_draft() -> CarDetailsDraft {
    CarDetailsDraft {
        make: "Toyota".to_owned(),
        model: "Corolla".to_owned(),
        year: 2021,
        color: "Blue".to_owned(),
        price_per_day: 45.0,
        description: "Reliable commuter".to_owned(),
        image_url: None,
        location: "Lisbon".to_owned(),
        features: vec!["Bluetooth".to_owned()],
    }
}

pub(crate) fn car_hosted_by(host: &User) -> Car {
    let details = CarDetails::new(car_draft()).expect("valid fixture details");
    Car::list(host.id(), details, now())
}

pub(crate) fn booking_of(
    car: &Car,
    renter: &User,
    (start, end): (u32, u32),
    status: BookingStatus,
) -> Booking {
    Booking {
        id: BookingId::random(),
        user_id: renter.id(),
        car_id: car.id,
        host_id: car.host_id,
        period: DateRange::new(june(start), june(end)).expect("valid fixture range"),
        terms: BookingTerms::new(225.0, "D1234567", None).expect("valid fixture terms"),
        status,
        created_at: now(),
    }
}
