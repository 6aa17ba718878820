//! HTML email bodies for each notification kind.
//!
//! Every interpolated user-supplied value is HTML-escaped.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::domain::{
    BookingConfirmationSnapshot, CompletedRentalSummary, Notification, NotificationKind, Role,
};

const BRAND: &str = "CarShare";

/// Subject line and HTML body of one email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Render `notification` into an email.
///
/// `frontend_url` is the base the verification and welcome links point at.
pub fn render(notification: &Notification, frontend_url: &str) -> EmailContent {
    let name = escape(&notification.recipient.name);
    match &notification.kind {
        NotificationKind::Verification { token } => {
            let link = format!("{frontend_url}?verify={}", escape(token.as_ref()));
            EmailContent {
                subject: format!("Welcome to {BRAND} - Verify Your Email"),
                html: layout(
                    "Verify Your Email",
                    &(format!("<h2>Welcome to {BRAND}, {name}!</h2>")
                        + "<p>Thank you for joining our car rental marketplace. Please verify \
                           your email address to activate your account.</p>"
                        + &button(&link, "Verify Email Address")),
                ),
            }
        }
        NotificationKind::Welcome { role } => welcome(&name, *role, frontend_url),
        NotificationKind::PasswordReset {
            code,
            valid_for_minutes,
        } => password_reset(&name, code.as_ref(), *valid_for_minutes),
        NotificationKind::BookingConfirmed(snapshot) => booking_confirmed(&name, snapshot),
        NotificationKind::BookingCompleted(summary) => thank_you(&name, summary),
    }
}

fn welcome(name: &str, role: Role, frontend_url: &str) -> EmailContent {
    let (title, pitch) = match role {
        Role::Host => (
            "Host",
            "As a host you can now list your cars and start earning. Log in to add your \
             first vehicle.",
        ),
        Role::Renter => (
            "Renter",
            "Explore vehicles from trusted local hosts and find the right car for any trip.",
        ),
    };
    EmailContent {
        subject: format!("Welcome to {BRAND} - Your {title} Account is Ready!"),
        html: layout(
            "Welcome",
            &(format!(
                "<h2>Hello {name}!</h2><p>Your email has been verified and your {BRAND} \
                 account is active.</p><p>{pitch}</p>"
            ) + &button(frontend_url, &format!("Start Using {BRAND}"))),
        ),
    }
}

fn password_reset(name: &str, code: &str, valid_for_minutes: i64) -> EmailContent {
    EmailContent {
        subject: format!("{BRAND} - Password Reset OTP"),
        html: layout(
            "Password Reset",
            &format!(
                "<h2>Hello {name}!</h2><p>You requested a password reset for your {BRAND} \
                 account. Use the code below to choose a new password:</p>\
                 <div style=\"background:#f8f9fa;padding:20px;border-radius:8px;\
                 text-align:center\"><div style=\"font-size:32px;font-weight:bold;\
                 color:#667eea;letter-spacing:8px\">{code}</div>\
                 <p>This code expires in {valid_for_minutes} minutes.</p></div>\
                 <p>If you didn't request this, you can ignore this email.</p>"
            ),
        ),
    }
}

fn booking_confirmed(name: &str, snapshot: &BookingConfirmationSnapshot) -> EmailContent {
    let mut details = String::new();
    let rows = [
        (
            "Car",
            format!(
                "{} {} {}",
                snapshot.car_year,
                escape(&snapshot.car_make),
                escape(&snapshot.car_model)
            ),
        ),
        ("Booking ID", snapshot.booking_id.to_string()),
        ("Start Date", long_date(snapshot.start_date)),
        ("End Date", long_date(snapshot.end_date)),
        ("Total Amount", format!("${:.2}", snapshot.total_amount)),
        ("Location", escape(&snapshot.location)),
    ];
    for (label, value) in rows {
        let _ = write!(details, "<p><strong>{label}:</strong> {value}</p>");
    }

    EmailContent {
        subject: format!(
            "Booking Confirmed - {} {}",
            snapshot.car_make, snapshot.car_model
        ),
        html: layout(
            "Booking Confirmation",
            &format!(
                "<h2>Hello {name}!</h2><p>Your booking has been confirmed. Here are your \
                 rental details:</p><div>{details}</div><p>Your host will contact you soon \
                 with pickup instructions. Have a great trip!</p>"
            ),
        ),
    }
}

fn thank_you(name: &str, summary: &CompletedRentalSummary) -> EmailContent {
    EmailContent {
        subject: format!("Thank You for Using {BRAND}!"),
        html: layout(
            "Thank You",
            &format!(
                "<h2>Hello {name}!</h2><p>Thank you for returning the {} {}! We hope you had \
                 a wonderful experience.</p><p>Please consider leaving a review to help \
                 other renters.</p>",
                escape(&summary.make),
                escape(&summary.model)
            ),
        ),
    }
}

/// `June 01, 2024`.
pub fn long_date(value: DateTime<Utc>) -> String {
    value.format("%B %d, %Y").to_string()
}

fn button(href: &str, label: &str) -> String {
    format!(
        "<p style=\"text-align:center;margin:30px 0\"><a href=\"{href}\" \
         style=\"display:inline-block;background:#667eea;color:#fff;padding:15px 30px;\
         border-radius:8px;text-decoration:none;font-weight:bold\">{label}</a></p>"
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title} - {BRAND}</title>\
         </head><body style=\"font-family:Arial,sans-serif;background:#f4f4f4\">\
         <div style=\"max-width:600px;margin:0 auto;background:#fff\">\
         <div style=\"background:#667eea;padding:40px 20px;text-align:center\">\
         <h1 style=\"color:#fff;margin:0\">{BRAND}</h1></div>\
         <div style=\"padding:40px 30px\">{body}</div></div></body></html>"
    )
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
