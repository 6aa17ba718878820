//! Tests for the account handlers.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::{EmailAddress, Error, ErrorCode};
use crate::inbound::http::test_utils::{session_cookie, sign_up, test_app, test_marketplace};

fn register_body(email: &str) -> Value {
    json!({
        "email": email,
        "password": "correct horse battery",
        "name": "Rita Renter",
    })
}

#[actix_web::test]
async fn register_acknowledges_and_withholds_the_session() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(register_body("rita@example.com"))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .response()
            .cookies()
            .all(|cookie| cookie.name() != "session")
    );
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["email"], "rita@example.com");
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("Registration successful"))
    );
}

#[actix_web::test]
async fn register_rejects_a_duplicate_email() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;

    for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
        let request = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body("rita@example.com"))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), expected);
    }
}

#[rstest]
#[case(json!({"email": "rita@gmial.com", "password": "correct horse", "name": "Rita"}), "email", "email_typo")]
#[case(json!({"email": "not-an-email", "password": "correct horse", "name": "Rita"}), "email", "invalid_value")]
#[case(json!({"email": "rita@example.com", "password": "short", "name": "Rita"}), "password", "invalid_value")]
#[case(json!({"email": "rita@example.com", "password": "correct horse", "name": "  "}), "name", "invalid_value")]
#[case(json!({"email": "rita@example.com", "password": "correct horse", "name": "Rita", "role": "admin"}), "role", "invalid_value")]
#[actix_web::test]
async fn register_reports_the_offending_field(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(body)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Error = test::read_body_json(response).await;
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details");
    assert_eq!(details["field"], field);
    assert_eq!(details["code"], code);
}

#[actix_web::test]
async fn login_is_refused_until_the_email_is_verified() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    let register = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(register_body("rita@example.com"))
        .to_request();
    test::call_service(&app, register).await;

    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "rita@example.com", "password": "correct horse battery"}))
        .to_request();
    let response = test::call_service(&app, login).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn verified_user_logs_in_and_reads_their_account() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    sign_up(&app, &market.store, "rita@example.com", "user").await;

    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "rita@example.com", "password": "correct horse battery"}))
        .to_request();
    let response = test::call_service(&app, login).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    let me = test::TestRequest::get()
        .uri("/api/v1/auth/me")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, me).await;
    assert_eq!(body["email"], "rita@example.com");
    assert_eq!(body["role"], "user");
    assert_eq!(body["isVerified"], true);
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("verificationToken").is_none());
}

#[rstest]
#[case("correct horse battery", "nobody@example.com")]
#[case("wrong password!", "rita@example.com")]
#[actix_web::test]
async fn bad_credentials_are_unauthorised(#[case] password: &str, #[case] email: &str) {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    sign_up(&app, &market.store, "rita@example.com", "user").await;

    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": email, "password": password}))
        .to_request();
    let response = test::call_service(&app, login).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn unknown_verification_token_is_rejected() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/verify-email")
        .set_json(json!({"token": "deadbeef"}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case(json!({}), StatusCode::BAD_REQUEST)]
#[case(json!({"email": "ghost@example.com"}), StatusCode::NOT_FOUND)]
#[case(json!({"email": "rita@example.com"}), StatusCode::OK)]
#[actix_web::test]
async fn resend_verification_outcomes(#[case] body: Value, #[case] expected: StatusCode) {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    let register = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(register_body("rita@example.com"))
        .to_request();
    test::call_service(&app, register).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/resend-verification")
        .set_json(body)
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), expected);
}

#[actix_web::test]
async fn resend_is_refused_once_verified() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    sign_up(&app, &market.store, "rita@example.com", "user").await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/resend-verification")
        .set_json(json!({"email": "rita@example.com"}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn me_requires_a_session() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;

    let request = test::TestRequest::get().uri("/api/v1/auth/me").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn change_role_switches_to_host() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    let cookie = sign_up(&app, &market.store, "rita@example.com", "user").await;

    let request = test::TestRequest::put()
        .uri("/api/v1/auth/change-role")
        .cookie(cookie.clone())
        .set_json(json!({"newRole": "host"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["message"], "Role changed to host successfully");
    assert_eq!(body["user"]["role"], "host");
}

#[actix_web::test]
async fn change_role_rejects_unknown_roles() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    let cookie = sign_up(&app, &market.store, "rita@example.com", "user").await;

    let request = test::TestRequest::put()
        .uri("/api/v1/auth/change-role")
        .cookie(cookie)
        .set_json(json!({"newRole": "admin"}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profile_update_keeps_omitted_fields() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    let cookie = sign_up(&app, &market.store, "rita@example.com", "user").await;

    let request = test::TestRequest::put()
        .uri("/api/v1/profile")
        .cookie(cookie)
        .set_json(json!({"name": "Rita R.", "bio": "Weekend driver"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["name"], "Rita R.");
    assert_eq!(body["bio"], "Weekend driver");
    assert_eq!(body["phone"], "+351 900 000 000");
}

#[actix_web::test]
async fn forgot_password_reply_does_not_reveal_registration() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    sign_up(&app, &market.store, "rita@example.com", "user").await;

    let mut replies = Vec::new();
    for email in ["rita@example.com", "ghost@example.com"] {
        let request = test::TestRequest::post()
            .uri("/api/v1/auth/forgot-password")
            .set_json(json!({ "email": email }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        replies.push(body);
    }

    assert_eq!(replies[0], replies[1]);
    assert_eq!(
        replies[0]["message"],
        "If the email exists, you will receive a password reset OTP."
    );
    let ghost = EmailAddress::new("ghost@example.com").expect("valid email");
    assert!(market.store.reset_code_for(&ghost).is_none());
}

async fn login_status<S, B>(app: &S, password: &str) -> StatusCode
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let login = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "rita@example.com", "password": password}))
        .to_request();
    test::call_service(app, login).await.status()
}

#[actix_web::test]
async fn reset_code_replaces_the_password_once() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    sign_up(&app, &market.store, "rita@example.com", "user").await;

    let forgot = test::TestRequest::post()
        .uri("/api/v1/auth/forgot-password")
        .set_json(json!({"email": "rita@example.com"}))
        .to_request();
    assert_eq!(test::call_service(&app, forgot).await.status(), StatusCode::OK);
    let address = EmailAddress::new("rita@example.com").expect("valid email");
    let code = market
        .store
        .reset_code_for(&address)
        .expect("reset code stored");
    let reset_body = json!({
        "email": "rita@example.com",
        "otp": code.as_ref(),
        "newPassword": "a brand new secret",
    });

    let reset = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(&reset_body)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, reset).await;
    assert_eq!(body["message"], "Password reset successfully");

    assert_eq!(
        login_status(&app, "correct horse battery").await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(login_status(&app, "a brand new secret").await, StatusCode::OK);

    let replay = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(&reset_body)
        .to_request();
    let response = test::call_service(&app, replay).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: Value = test::read_body_json(response).await;
    assert_eq!(error["message"], "OTP has expired or is invalid");
}

#[rstest]
#[case::unknown_email("ghost@example.com", "123456", "Invalid email or OTP")]
#[case::no_code_requested("rita@example.com", "123456", "OTP has expired or is invalid")]
#[actix_web::test]
async fn reset_password_rejections(
    #[case] email: &str,
    #[case] otp: &str,
    #[case] message: &str,
) {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;
    sign_up(&app, &market.store, "rita@example.com", "user").await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({"email": email, "otp": otp, "newPassword": "a brand new secret"}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["message"], message);
}

#[actix_web::test]
async fn malformed_reset_code_names_the_otp_field() {
    let market = test_marketplace();
    let app = test::init_service(test_app(market.state.clone())).await;

    let request = test::TestRequest::post()
        .uri("/api/v1/auth/reset-password")
        .set_json(json!({"email": "rita@example.com", "otp": "12ab", "newPassword": "a brand new secret"}))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], "otp");
}
