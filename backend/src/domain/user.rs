//! Marketplace user identity.
//!
//! Users are either renters or hosts. The booking core only looks at the id
//! and the role; everything else here exists for the account surface.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::UserId;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidEmail,
    EmailTypo { suggestion: String },
    EmptyName,
    NameTooLong { max: usize },
    PasswordTooShort { min: usize },
    UnknownRole { value: String },
    InvalidResetCode,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTypo { suggestion } => write!(
                f,
                "did you mean '{suggestion}'? Please check your email address"
            ),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::UnknownRole { value } => {
                write!(f, "role '{value}' is not one of renter or host")
            }
            Self::InvalidResetCode => write!(f, "reset code must be {RESET_CODE_LEN} digits"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Marketplace role held by a user.
///
/// The wire name of the renter role is `user`; `renter` is accepted as an
/// alias on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Books cars.
    #[serde(rename = "user", alias = "renter")]
    Renter,
    /// Lists cars and manages their bookings.
    #[serde(rename = "host")]
    Host,
}

impl Role {
    /// Stable storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Renter => "user",
            Self::Host => "host",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "renter" => Ok(Self::Renter),
            "host" => Ok(Self::Host),
            _ => Err(UserValidationError::UnknownRole {
                value: s.to_owned(),
            }),
        }
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

const DOMAIN_TYPOS: &[(&str, &str)] = &[
    ("gmial.com", "gmail.com"),
    ("gmai.com", "gmail.com"),
    ("yahooo.com", "yahoo.com"),
    ("hotmial.com", "hotmail.com"),
    ("outlok.com", "outlook.com"),
    ("gmailcom", "gmail.com"),
];

/// Normalised, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new(" Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.com");
    /// assert!(EmailAddress::new("ada@gmial.com").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_ascii_lowercase();
        if let Some((local, domain)) = normalised.split_once('@')
            && let Some((_, fix)) = DOMAIN_TYPOS.iter().find(|(typo, _)| *typo == domain)
        {
            return Err(UserValidationError::EmailTypo {
                suggestion: format!("{local}@{fix}"),
            });
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum length of a person's name.
pub const PERSON_NAME_MAX: usize = 100;

/// Name shown to counterparties and used in notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate a trimmed, non-empty name.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > PERSON_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: PERSON_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;

/// Plain-text password held only long enough to hash or verify it.
///
/// The buffer is wiped on drop.
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept a password of at least [`PASSWORD_MIN`] characters.
    pub fn new(raw: String) -> Result<Self, UserValidationError> {
        let raw = Zeroizing::new(raw);
        if raw.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(raw))
    }

    /// Wrap a password without length checks, for login attempts.
    #[must_use]
    pub fn unchecked(raw: String) -> Self {
        Self(Zeroizing::new(raw))
    }

    /// Borrow the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Encoded password hash as produced by a [`crate::domain::ports::PasswordHasher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Opaque single-use token mailed to confirm an email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerificationToken(String);

impl VerificationToken {
    /// Generate 32 random bytes, hex encoded.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a token received from a client or a store.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for VerificationToken {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Number of digits in a password reset code.
pub const RESET_CODE_LEN: usize = 6;

/// One-time numeric code mailed to reset a forgotten password.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetCode(String);

impl ResetCode {
    /// Draw a uniformly random code, zero padded to [`RESET_CODE_LEN`] digits.
    #[must_use]
    pub fn generate() -> Self {
        let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    /// Accept exactly [`RESET_CODE_LEN`] ASCII digits.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::ResetCode;
    ///
    /// assert!(ResetCode::new("004217").is_ok());
    /// assert!(ResetCode::new("4217").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = raw.as_ref().trim();
        if raw.len() != RESET_CODE_LEN || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UserValidationError::InvalidResetCode);
        }
        Ok(Self(raw.to_owned()))
    }
}

impl AsRef<str> for ResetCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ResetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetCode(***)")
    }
}

/// Outstanding reset code and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetGrant {
    pub code: ResetCode,
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetGrant {
    /// Whether `now` is past the expiry instant.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Optional contact and biography fields editable by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

/// Input for [`User::new`].
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: PersonName,
    pub role: Role,
    pub profile: UserProfile,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Application user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: PersonName,
    role: Role,
    profile: UserProfile,
    verified: bool,
    created_at: DateTime<Utc>,
}

/// Partial update applied through the identity store.
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<PersonName>,
    pub role: Option<Role>,
    pub profile: Option<UserProfile>,
    pub verified: Option<bool>,
}

impl User {
    /// Build a user from validated parts.
    #[must_use]
    pub fn new(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            email,
            name,
            role,
            profile,
            verified,
            created_at,
        } = draft;
        Self {
            id,
            email,
            name,
            role,
            profile,
            verified,
            created_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Login and notification address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &PersonName {
        &self.name
    }

    /// Current marketplace role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Optional profile fields.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Whether the email address has been confirmed.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Registration time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Return a copy with the update applied.
    #[must_use]
    pub fn apply(&self, update: &UserUpdate) -> Self {
        let mut next = self.clone();
        if let Some(name) = &update.name {
            next.name = name.clone();
        }
        if let Some(role) = update.role {
            next.role = role;
        }
        if let Some(profile) = &update.profile {
            next.profile = profile.clone();
        }
        if let Some(verified) = update.verified {
            next.verified = verified;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_user() -> User {
        User::new(UserDraft {
            id: UserId::random(),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            name: PersonName::new("Ada").expect("valid name"),
            role: Role::Renter,
            profile: UserProfile::default(),
            verified: false,
            created_at: Utc::now(),
        })
    }

    #[rstest]
    #[case("ada@gmial.com", "ada@gmail.com")]
    #[case("bob@hotmial.com", "bob@hotmail.com")]
    #[case("eve@gmailcom", "eve@gmail.com")]
    fn email_typos_suggest_corrections(#[case] raw: &str, #[case] suggestion: &str) {
        let err = EmailAddress::new(raw).expect_err("typo rejected");
        assert_eq!(
            err,
            UserValidationError::EmailTypo {
                suggestion: suggestion.to_owned()
            }
        );
    }

    #[rstest]
    #[case("12345")]
    #[case("1234567")]
    #[case("12a456")]
    #[case("")]
    fn reset_codes_are_six_digits(#[case] raw: &str) {
        assert_eq!(
            ResetCode::new(raw),
            Err(UserValidationError::InvalidResetCode)
        );
    }

    #[rstest]
    fn generated_reset_codes_are_zero_padded_digits() {
        for _ in 0..64 {
            let code = ResetCode::generate();
            assert_eq!(ResetCode::new(code.as_ref()), Ok(code));
        }
    }

    #[rstest]
    fn reset_grant_expires_strictly_after_its_deadline() {
        let deadline = Utc::now();
        let grant = PasswordResetGrant {
            code: ResetCode::generate(),
            expires_at: deadline,
        };

        assert!(!grant.is_expired(deadline));
        assert!(grant.is_expired(deadline + chrono::Duration::seconds(1)));
    }

    #[rstest]
    #[case("no-at-sign")]
    #[case("two@@example.com")]
    #[case("spaces in@example.com")]
    fn malformed_emails_are_rejected(#[case] raw: &str) {
        assert_eq!(
            EmailAddress::new(raw),
            Err(UserValidationError::InvalidEmail)
        );
    }

    #[rstest]
    #[case("user", Role::Renter)]
    #[case("renter", Role::Renter)]
    #[case("HOST", Role::Host)]
    fn roles_parse_from_wire_names(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
    }

    #[rstest]
    fn renter_role_serialises_as_user() {
        let value = serde_json::to_value(Role::Renter).expect("serialise role");
        assert_eq!(value, serde_json::json!("user"));
    }

    #[rstest]
    fn short_passwords_are_rejected() {
        let err = Password::new("short".to_owned()).expect_err("too short");
        assert_eq!(err, UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }

    #[rstest]
    fn password_debug_is_redacted() {
        let password = Password::unchecked("hunter22".to_owned());
        assert_eq!(format!("{password:?}"), "Password(***)");
    }

    #[rstest]
    fn verification_tokens_are_unique_hex() {
        let first = VerificationToken::generate();
        let second = VerificationToken::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_ref().len(), 64);
        assert!(first.as_ref().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn apply_only_touches_supplied_fields() {
        let user = sample_user();
        let updated = user.apply(&UserUpdate {
            role: Some(Role::Host),
            verified: Some(true),
            ..UserUpdate::default()
        });

        assert_eq!(updated.role(), Role::Host);
        assert!(updated.is_verified());
        assert_eq!(updated.name(), user.name());
        assert_eq!(updated.email(), user.email());
    }
}
