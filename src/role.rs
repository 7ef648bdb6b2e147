//! Role classification.
//!
//! Raw role strings come from session data with inconsistent casing. They
//! are normalized here once; everything downstream works on [`Role`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// A principal's permission tier. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Dietitian coaching clients.
    Dietitian,
    /// Health counselor coaching clients.
    HealthCounselor,
    /// Coached client.
    Client,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [Role::Admin, Role::Dietitian, Role::HealthCounselor, Role::Client];

    /// The canonical wire spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Dietitian => "DIETITIAN",
            Role::HealthCounselor => "HEALTH_COUNSELOR",
            Role::Client => "CLIENT",
        }
    }

    /// Returns `true` for roles that coach clients.
    #[inline]
    pub fn is_coach(&self) -> bool {
        matches!(self, Role::Dietitian | Role::HealthCounselor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match classify(Some(s)) {
            ClassifiedRole::Known(role) => Ok(role),
            ClassifiedRole::Unknown => Err(AccessError::UnknownRole(Some(s.to_string()))),
        }
    }
}

/// The result of classifying a raw role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifiedRole {
    /// One of the closed enumeration.
    Known(Role),
    /// Missing, empty, or unrecognized. Never grants access.
    Unknown,
}

impl ClassifiedRole {
    /// Returns the role if it is known.
    #[inline]
    pub fn known(&self) -> Option<Role> {
        match self {
            ClassifiedRole::Known(role) => Some(*role),
            ClassifiedRole::Unknown => None,
        }
    }

    /// Returns `true` only for a known `Admin` role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, ClassifiedRole::Known(Role::Admin))
    }
}

impl From<Role> for ClassifiedRole {
    fn from(role: Role) -> Self {
        ClassifiedRole::Known(role)
    }
}

/// Classify a raw role string.
///
/// Matching is case-insensitive, ignores surrounding whitespace and treats
/// `-` like `_`. Anything else is `Unknown`. Never fails.
pub fn classify(raw: Option<&str>) -> ClassifiedRole {
    let Some(raw) = raw else {
        return ClassifiedRole::Unknown;
    };
    let raw = raw.trim();

    Role::ALL
        .into_iter()
        .find(|role| eq_role_spelling(raw, role.as_str()))
        .map(ClassifiedRole::Known)
        .unwrap_or(ClassifiedRole::Unknown)
}

fn eq_role_spelling(raw: &str, canonical: &str) -> bool {
    raw.len() == canonical.len()
        && raw.bytes().zip(canonical.bytes()).all(|(a, b)| {
            let a = if a == b'-' { b'_' } else { a };
            a.eq_ignore_ascii_case(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_canonical() {
        assert_eq!(classify(Some("ADMIN")), ClassifiedRole::Known(Role::Admin));
        assert_eq!(classify(Some("DIETITIAN")), ClassifiedRole::Known(Role::Dietitian));
        assert_eq!(
            classify(Some("HEALTH_COUNSELOR")),
            ClassifiedRole::Known(Role::HealthCounselor)
        );
        assert_eq!(classify(Some("CLIENT")), ClassifiedRole::Known(Role::Client));
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify(Some("admin")), ClassifiedRole::Known(Role::Admin));
        assert_eq!(classify(Some("Dietitian")), ClassifiedRole::Known(Role::Dietitian));
        assert_eq!(
            classify(Some("health_counselor")),
            ClassifiedRole::Known(Role::HealthCounselor)
        );
        assert_eq!(
            classify(Some("health-counselor")),
            ClassifiedRole::Known(Role::HealthCounselor)
        );
        assert_eq!(classify(Some("  client ")), ClassifiedRole::Known(Role::Client));
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify(None), ClassifiedRole::Unknown);
        assert_eq!(classify(Some("")), ClassifiedRole::Unknown);
        assert_eq!(classify(Some("superadmin")), ClassifiedRole::Unknown);
        assert_eq!(classify(Some("admin ")), ClassifiedRole::Known(Role::Admin));
        assert_eq!(classify(Some("ad min")), ClassifiedRole::Unknown);
        assert_eq!(classify(Some("HEALTHCOUNSELOR")), ClassifiedRole::Unknown);
        assert_eq!(classify(Some("ådmin")), ClassifiedRole::Unknown);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("client".parse::<Role>(), Ok(Role::Client));
        assert_eq!(
            "root".parse::<Role>(),
            Err(AccessError::UnknownRole(Some("root".into())))
        );
    }

    #[test]
    fn test_display_round_trips_through_classify() {
        for role in Role::ALL {
            assert_eq!(classify(Some(role.to_string().as_str())), ClassifiedRole::Known(role));
        }
    }

    #[test]
    fn test_serde_spelling() {
        let json = serde_json::to_string(&Role::HealthCounselor).unwrap();
        assert_eq!(json, "\"HEALTH_COUNSELOR\"");
        let role: Role = serde_json::from_str("\"DIETITIAN\"").unwrap();
        assert_eq!(role, Role::Dietitian);
    }

    #[test]
    fn test_classified_role_helpers() {
        assert!(ClassifiedRole::Known(Role::Admin).is_admin());
        assert!(!ClassifiedRole::Known(Role::Client).is_admin());
        assert!(!ClassifiedRole::Unknown.is_admin());
        assert_eq!(ClassifiedRole::Unknown.known(), None);
        assert!(Role::Dietitian.is_coach());
        assert!(!Role::Admin.is_coach());
    }
}
