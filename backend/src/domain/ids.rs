//! Identifier newtypes and the acting principal.
//!
//! Every identifier that reaches the table store is a trimmed, non-blank
//! string. Validating at construction means blank identifiers are rejected
//! before any store access.

use std::fmt;
use std::sync::OnceLock;

use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by identifier constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValidationError {
    /// The identifier was empty or whitespace.
    Blank {
        /// Human-readable identifier kind, e.g. `"trip id"`.
        kind: &'static str,
    },
    /// The email address is not of the form `local@domain`.
    InvalidEmail,
}

impl fmt::Display for IdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank { kind } => write!(f, "{kind} must not be blank"),
            Self::InvalidEmail => write!(f, "email address must look like name@domain"),
        }
    }
}

impl std::error::Error for IdValidationError {}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier, trimming surrounding
            /// whitespace.
            pub fn new(value: impl AsRef<str>) -> Result<Self, IdValidationError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(IdValidationError::Blank { kind: $kind });
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

macro_rules! define_generated_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        define_id!($(#[$meta])* $name => $kind);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }
        }
    };
}

define_id!(
    /// Stable subject identifier of an authenticated user.
    UserId => "user id"
);
define_generated_id!(
    /// Trip identifier; the row key of a trip row.
    TripId => "trip id"
);
define_generated_id!(
    /// Itinerary entry identifier, unique within its trip.
    EntryId => "entry id"
);
define_generated_id!(
    /// Booking identifier, unique within its trip.
    BookingId => "booking id"
);
define_generated_id!(
    /// Access grant identifier, unique within its trip.
    AccessId => "access id"
);
define_generated_id!(
    /// Saved share link identifier, unique per user.
    SavedLinkId => "saved link id"
);
define_id!(
    /// Globally unique code granting anonymous read access to a trip.
    ShareCode => "share code"
);

impl ShareCode {
    /// Generate a random alphanumeric share code of `length` characters.
    pub fn generate(length: usize) -> Self {
        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length.max(1))
            .map(char::from)
            .collect();
        Self(code)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Lower-cased email address used to resolve access grants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use itinerary::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_str(), "ada@example.com");
    /// assert!(EmailAddress::new("not-an-email").is_err());
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdValidationError> {
        let normalised = value.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(IdValidationError::Blank { kind: "email" });
        }
        if !email_regex().is_match(&normalised) {
            return Err(IdValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = IdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The identity acting on a repository call.
///
/// Sourced from the authentication layer and passed opaquely; the core only
/// checks that the values are non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    email: Option<EmailAddress>,
}

impl Principal {
    /// Build a principal from validated parts.
    pub fn new(user_id: UserId, email: Option<EmailAddress>) -> Self {
        Self { user_id, email }
    }

    /// Build a principal from raw strings. A blank email is treated as absent.
    pub fn from_strings(
        user_id: impl AsRef<str>,
        email: Option<&str>,
    ) -> Result<Self, IdValidationError> {
        let user_id = UserId::new(user_id)?;
        let email = email
            .filter(|value| !value.trim().is_empty())
            .map(EmailAddress::new)
            .transpose()?;
        Ok(Self { user_id, email })
    }

    /// Stable user identifier.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Email used for access-list resolution, when known.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for identifier validation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_identifiers_are_rejected(#[case] raw: &str) {
        assert_eq!(
            TripId::new(raw),
            Err(IdValidationError::Blank { kind: "trip id" })
        );
    }

    #[rstest]
    fn identifiers_are_trimmed() {
        let id = EntryId::new("  abc ").expect("valid id");
        assert_eq!(id.as_str(), "abc");
    }

    #[rstest]
    fn generated_identifiers_are_unique() {
        assert_ne!(BookingId::generate(), BookingId::generate());
    }

    #[rstest]
    #[case(6)]
    #[case(10)]
    #[case(32)]
    fn share_codes_have_requested_length(#[case] length: usize) {
        let code = ShareCode::generate(length);
        assert_eq!(code.as_str().len(), length);
        assert!(code.as_str().chars().all(|ch| ch.is_ascii_alphanumeric()));
    }

    #[rstest]
    fn identifiers_deserialise_through_validation() {
        let parsed: Result<UserId, _> = serde_json::from_str("\"  \"");
        assert!(parsed.is_err());
        let parsed: UserId = serde_json::from_str("\"user-1\"").expect("valid user id");
        assert_eq!(parsed.as_str(), "user-1");
    }

    #[rstest]
    fn principal_treats_blank_email_as_absent() {
        let principal = Principal::from_strings("user-1", Some("  ")).expect("valid principal");
        assert!(principal.email().is_none());
    }

    #[rstest]
    fn principal_rejects_blank_user_id() {
        let result = Principal::from_strings(" ", Some("ada@example.com"));
        assert_eq!(
            result,
            Err(IdValidationError::Blank { kind: "user id" })
        );
    }

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("ada@", false)]
    #[case("@example.com", false)]
    #[case("a b@example.com", false)]
    fn email_validation(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(EmailAddress::new(raw).is_ok(), valid);
    }
}
