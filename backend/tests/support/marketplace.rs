//! In-memory marketplace harness driving the real domain services.

use std::sync::Arc;

use argon2::Params;
use backend::domain::ports::{
    CreateBookingRequest, CreateCarRequest, NoOpNotificationDispatcher, RegisterRequest,
    VerifyEmailRequest,
};
use backend::domain::{
    CarDetailsDraft, CarId, EmailAddress, Password, PersonName, Role, UserId,
};
use backend::inbound::http::state::{HttpStatePorts, MarketplaceAdapters};
use backend::outbound::memory::InMemoryMarketplace;
use backend::outbound::receipt::PdfReceiptRenderer;
use backend::outbound::security::Argon2PasswordHasher;
use chrono::{DateTime, TimeZone, Utc};
use mockable::DefaultClock;

pub struct Marketplace {
    pub store: Arc<InMemoryMarketplace>,
    pub ports: HttpStatePorts,
}

/// Wire every service over one fresh in-memory store.
pub fn marketplace() -> Marketplace {
    let store = Arc::new(InMemoryMarketplace::new());
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("cheap argon2 params");
    let ports = HttpStatePorts::wire(MarketplaceAdapters {
        users: Arc::clone(&store),
        cars: Arc::clone(&store),
        bookings: Arc::clone(&store),
        reviews: Arc::clone(&store),
        hasher: Arc::new(Argon2PasswordHasher::with_params(params)),
        notifier: Arc::new(NoOpNotificationDispatcher),
        receipts: Arc::new(PdfReceiptRenderer),
        clock: Arc::new(DefaultClock),
    });
    Marketplace { store, ports }
}

pub fn june(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0)
        .single()
        .expect("valid June date")
}

impl Marketplace {
    /// Register and verify an account.
    pub async fn verified_user(&self, email: &str, role: Role) -> UserId {
        let email = EmailAddress::new(email).expect("valid email");
        let registered = self
            .ports
            .accounts
            .register(RegisterRequest {
                email: email.clone(),
                password: Password::new("correct horse battery".to_owned())
                    .expect("valid password"),
                name: PersonName::new(format!("Tester {role}")).expect("valid name"),
                role,
                phone: None,
            })
            .await
            .expect("registration succeeds");
        let token = self
            .store
            .verification_token_for(&email)
            .expect("verification token stored");
        self.ports
            .accounts
            .verify_email(VerifyEmailRequest { token })
            .await
            .expect("verification succeeds");
        registered.id
    }

    /// List a car for `host`.
    pub async fn listed_car(&self, host: UserId) -> CarId {
        self.ports
            .cars
            .create_car(CreateCarRequest {
                actor: host,
                details: CarDetailsDraft {
                    make: "Toyota".to_owned(),
                    model: "Corolla".to_owned(),
                    year: 2021,
                    color: "Blue".to_owned(),
                    price_per_day: 45.0,
                    description: "Reliable commuter".to_owned(),
                    image_url: None,
                    location: "Lisbon".to_owned(),
                    features: vec!["Bluetooth".to_owned()],
                },
            })
            .await
            .expect("car listed")
            .id
    }
}

pub fn booking(
    renter: UserId,
    car_id: CarId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> CreateBookingRequest {
    CreateBookingRequest {
        actor: renter,
        car_id,
        start_date: start,
        end_date: end,
        total_amount: 45.0 * (((end - start).num_days() + 1) as f64),
        driver_license: "PT-123456".to_owned(),
        additional_notes: None,
    }
}
