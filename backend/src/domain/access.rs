//! Collaborator access grants and the authorisation policy.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccessId, EmailAddress, TripId, UserId, VersionTag};

/// Permission level a principal holds on a trip.
///
/// `Owner` is implicit (partition match) and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessLevel {
    /// The trip's owner.
    Owner,
    /// Everything except deleting the trip or managing its access list.
    FullControl,
    /// View only.
    ReadOnly,
}

/// Something a principal may try to do with a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read the trip and its dependents.
    View,
    /// Change the trip, entries, bookings or share links.
    Edit,
    /// Delete the trip row.
    DeleteTrip,
    /// Grant or revoke collaborator access.
    ManageAccess,
}

impl AccessLevel {
    /// Whether this level grants `capability`.
    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::View => true,
            Capability::Edit => matches!(self, Self::Owner | Self::FullControl),
            Capability::DeleteTrip | Capability::ManageAccess => self == Self::Owner,
        }
    }

    /// Name written to the `Permission` column.
    pub fn storage_name(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::FullControl => "FullControl",
            Self::ReadOnly => "ReadOnly",
        }
    }

    /// Tolerant parse of a stored permission; unknown values grant the
    /// least privilege.
    pub fn from_stored(raw: &str) -> Self {
        let folded: String = raw
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "fullcontrol" | "full" | "edit" | "editor" => Self::FullControl,
            _ => Self::ReadOnly,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_name())
    }
}

/// A stored grant of access to a trip for a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripAccess {
    /// Trip the grant applies to; the partition key.
    pub trip_id: TripId,
    /// Grant identifier; the row key.
    pub id: AccessId,
    /// Collaborator email the grant was issued to.
    pub email: EmailAddress,
    /// Collaborator user id, once resolved.
    pub user_id: Option<UserId>,
    /// Granted level; never `Owner`.
    pub level: AccessLevel,
    /// When the grant was issued.
    pub created_on: Option<DateTime<Utc>>,
    /// Who issued the grant.
    pub created_by: Option<UserId>,
    /// Store-issued entity tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionTag>,
}

impl TripAccess {
    /// Whether this grant belongs to the given identity.
    ///
    /// A grant bound to a user id matches only that user; an unbound grant
    /// matches by email.
    pub fn matches(&self, user_id: &UserId, email: Option<&EmailAddress>) -> bool {
        match self.user_id.as_ref() {
            Some(bound) => bound == user_id,
            None => email == Some(&self.email),
        }
    }

    /// True when matched by email but not yet bound to a user id.
    pub fn needs_claim(&self) -> bool {
        self.user_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AccessLevel::Owner, Capability::DeleteTrip, true)]
    #[case(AccessLevel::Owner, Capability::ManageAccess, true)]
    #[case(AccessLevel::FullControl, Capability::Edit, true)]
    #[case(AccessLevel::FullControl, Capability::DeleteTrip, false)]
    #[case(AccessLevel::FullControl, Capability::ManageAccess, false)]
    #[case(AccessLevel::ReadOnly, Capability::View, true)]
    #[case(AccessLevel::ReadOnly, Capability::Edit, false)]
    fn policy_matrix(
        #[case] level: AccessLevel,
        #[case] capability: Capability,
        #[case] expected: bool,
    ) {
        assert_eq!(level.allows(capability), expected);
    }

    fn grant(user_id: Option<&str>) -> TripAccess {
        TripAccess {
            trip_id: TripId::generate(),
            id: AccessId::generate(),
            email: EmailAddress::new("friend@example.com").expect("email"),
            user_id: user_id.map(|id| UserId::new(id).expect("user id")),
            level: AccessLevel::ReadOnly,
            created_on: None,
            created_by: None,
            version: None,
        }
    }

    #[rstest]
    fn unbound_grants_match_by_email() {
        let email = EmailAddress::new("Friend@example.com").expect("email");
        let user = UserId::new("u-1").expect("user id");
        assert!(grant(None).matches(&user, Some(&email)));
        assert!(!grant(None).matches(&user, None));
        assert!(grant(None).needs_claim());
    }

    #[rstest]
    fn bound_grants_match_only_their_user() {
        let email = EmailAddress::new("friend@example.com").expect("email");
        let bound = grant(Some("u-1"));
        assert!(bound.matches(&UserId::new("u-1").expect("user id"), None));
        assert!(!bound.matches(&UserId::new("u-2").expect("user id"), Some(&email)));
    }

    #[rstest]
    #[case("FullControl", AccessLevel::FullControl)]
    #[case("full_control", AccessLevel::FullControl)]
    #[case("ReadOnly", AccessLevel::ReadOnly)]
    #[case("Owner", AccessLevel::ReadOnly)]
    #[case("", AccessLevel::ReadOnly)]
    fn stored_permissions_parse_to_least_privilege(
        #[case] raw: &str,
        #[case] expected: AccessLevel,
    ) {
        assert_eq!(AccessLevel::from_stored(raw), expected);
    }
}
