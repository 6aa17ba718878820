//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use argon2::Params;
use serde_json::{Value, json};

use crate::domain::EmailAddress;
use crate::domain::ports::NoOpNotificationDispatcher;
use crate::domain::test_fixtures::fixture_clock;
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts, MarketplaceAdapters};
use crate::outbound::memory::InMemoryMarketplace;
use crate::outbound::receipt::PdfReceiptRenderer;
use crate::outbound::security::Argon2PasswordHasher;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over a fresh in-memory store.
pub struct TestMarketplace {
    pub store: Arc<InMemoryMarketplace>,
    pub state: web::Data<HttpState>,
}

/// Wire the real services over memory adapters, a cheap hasher and a
/// fixed clock (2024-05-20 09:30 UTC).
pub fn test_marketplace() -> TestMarketplace {
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
        clock: fixture_clock(),
    });
    TestMarketplace {
        store,
        state: web::Data::new(HttpState::new(ports)),
    }
}

/// The `/api/v1` scope behind a test session middleware.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .configure(configure_api),
    )
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// Register, verify and sign in a user; returns the session cookie.
pub async fn sign_up<S, B>(
    app: &S,
    store: &InMemoryMarketplace,
    email: &str,
    role: &str,
) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let register = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(json!({
            "email": email,
            "password": "correct horse battery",
            "name": format!("Tester {role}"),
            "role": role,
            "phone": "+351 900 000 000",
        }))
        .to_request();
    let response = test::call_service(app, register).await;
    assert!(response.status().is_success(), "register {email}");

    let address = EmailAddress::new(email).expect("valid email");
    let token = store
        .verification_token_for(&address)
        .expect("verification token stored");
    let verify = test::TestRequest::post()
        .uri("/api/v1/auth/verify-email")
        .set_json(json!({ "token": token.as_ref() }))
        .to_request();
    let response = test::call_service(app, verify).await;
    assert!(response.status().is_success(), "verify {email}");
    session_cookie(&response)
}

/// Create a car as the host behind `cookie`; returns its id.
pub async fn list_car<S, B>(app: &S, cookie: &Cookie<'static>, location: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/cars")
        .cookie(cookie.clone())
        .set_json(json!({
            "make": "Toyota",
            "model": "Corolla",
            "year": 2021,
            "color": "Blue",
            "pricePerDay": 45.0,
            "description": "Reliable commuter",
            "location": location,
            "features": ["Bluetooth"],
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(app, request).await;
    body["id"].as_str().expect("car id").to_owned()
}

/// Book `car_id` for the renter behind `cookie`; returns the response.
pub async fn book_car<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    car_id: &str,
    (start, end): (&str, &str),
) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::post()
        .uri("/api/v1/bookings")
        .cookie(cookie.clone())
        .set_json(json!({
            "carId": car_id,
            "startDate": start,
            "endDate": end,
            "totalAmount": 135.0,
            "driverLicense": "PT-123456",
        }))
        .to_request();
    test::call_service(app, request).await
}

/// Move a booking to `status` as the user behind `cookie`.
pub async fn set_status<S, B>(
    app: &S,
    cookie: &Cookie<'static>,
    booking_id: &str,
    status: &str,
) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = test::TestRequest::put()
        .uri(&format!("/api/v1/bookings/{booking_id}/status"))
        .cookie(cookie.clone())
        .set_json(json!({ "status": status }))
        .to_request();
    test::call_service(app, request).await
}
