//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details carry the
//! offending field and a stable code.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::json;

use crate::domain::{CarValidationError, Error, IdValidationError, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_field_error(field: FieldName, message: impl Into<String>) -> Error {
    ValidationError::new(field, message).with_code(ErrorCode::InvalidValue)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Parse a typed identifier, reporting failures against `field`.
pub(crate) fn parse_id<T>(
    value: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, IdValidationError>,
) -> Result<T, Error> {
    parse(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(
        field,
        format!("{name} must be an RFC 3339 timestamp or a YYYY-MM-DD date"),
    )
    .with_value(ErrorCode::InvalidTimestamp, value)
}

/// Parse a booking boundary.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` or
/// `YYYY-MM-DD HH:MM:SS` timestamps read as UTC, and plain `YYYY-MM-DD`
/// dates read as midnight UTC.
pub(crate) fn parse_booking_date(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    let raw = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| invalid_timestamp_error(field, value))
}

/// Map account value-object failures onto the field they concern.
pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    let message = err.to_string();
    match err {
        UserValidationError::EmailTypo { suggestion } => Error::invalid_request(message)
            .with_details(json!({
                "field": "email",
                "code": "email_typo",
                "suggestion": suggestion,
            })),
        UserValidationError::InvalidEmail => invalid_field_error(FieldName::new("email"), message),
        UserValidationError::EmptyName | UserValidationError::NameTooLong { .. } => {
            invalid_field_error(FieldName::new("name"), message)
        }
        UserValidationError::PasswordTooShort { .. } => {
            invalid_field_error(FieldName::new("password"), message)
        }
        UserValidationError::UnknownRole { .. } => {
            invalid_field_error(FieldName::new("role"), message)
        }
        UserValidationError::InvalidResetCode => {
            invalid_field_error(FieldName::new("otp"), message)
        }
    }
}

/// Map listing validation failures onto the field they concern.
pub(crate) fn car_validation_error(err: &CarValidationError) -> Error {
    invalid_field_error(FieldName::new(err.field()), err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::{CarId, ErrorCode as DomainCode};

    const START: FieldName = FieldName::new("startDate");

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error.details().and_then(|d| d.get(key)).and_then(Value::as_str)
    }

    #[rstest]
    #[case("2024-06-01T10:30:00Z", (2024, 6, 1, 10, 30))]
    #[case("2024-06-01T12:30:00+02:00", (2024, 6, 1, 10, 30))]
    #[case("2024-06-01T10:30:00", (2024, 6, 1, 10, 30))]
    #[case("2024-06-01 10:30:00", (2024, 6, 1, 10, 30))]
    #[case("2024-06-01", (2024, 6, 1, 0, 0))]
    #[case(" 2024-06-01 ", (2024, 6, 1, 0, 0))]
    fn booking_dates_accept_common_shapes(
        #[case] raw: &str,
        #[case] (y, mo, d, h, mi): (i32, u32, u32, u32, u32),
    ) {
        let expected = Utc
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .expect("valid date");
        assert_eq!(parse_booking_date(raw, START).expect("parsed"), expected);
    }

    #[rstest]
    #[case("")]
    #[case("06/01/2024")]
    #[case("2024-13-01")]
    #[case("tomorrow")]
    fn booking_dates_reject_other_shapes(#[case] raw: &str) {
        let error = parse_booking_date(raw, START).expect_err("rejected");
        assert_eq!(error.code(), DomainCode::InvalidRequest);
        assert_eq!(detail(&error, "field"), Some("startDate"));
        assert_eq!(detail(&error, "code"), Some("invalid_timestamp"));
        assert_eq!(detail(&error, "value"), Some(raw));
    }

    #[rstest]
    fn ids_report_the_field_and_value() {
        let error = parse_id("nope", FieldName::new("carId"), |raw| CarId::new(raw))
            .expect_err("rejected");
        assert_eq!(detail(&error, "field"), Some("carId"));
        assert_eq!(detail(&error, "code"), Some("invalid_uuid"));
        assert_eq!(detail(&error, "value"), Some("nope"));
    }

    #[rstest]
    fn email_typos_carry_the_suggestion() {
        let error = user_validation_error(UserValidationError::EmailTypo {
            suggestion: "ada@gmail.com".to_owned(),
        });
        assert_eq!(detail(&error, "code"), Some("email_typo"));
        assert_eq!(detail(&error, "suggestion"), Some("ada@gmail.com"));
    }

    #[rstest]
    #[case(UserValidationError::InvalidEmail, "email")]
    #[case(UserValidationError::EmptyName, "name")]
    #[case(UserValidationError::PasswordTooShort { min: 8 }, "password")]
    #[case(UserValidationError::UnknownRole { value: "admin".to_owned() }, "role")]
    #[case(UserValidationError::InvalidResetCode, "otp")]
    fn user_errors_name_their_field(#[case] err: UserValidationError, #[case] field: &str) {
        let error = user_validation_error(err);
        assert_eq!(detail(&error, "field"), Some(field));
        assert_eq!(detail(&error, "code"), Some("invalid_value"));
    }

    #[rstest]
    fn car_errors_name_their_field() {
        let error = car_validation_error(&CarValidationError::YearOutOfRange { year: 1850 });
        assert_eq!(detail(&error, "field"), Some("year"));
    }
}
