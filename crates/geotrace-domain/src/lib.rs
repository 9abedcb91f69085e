//! # Geotrace Domain Model
//!
//! Core data contracts for the geotrace location-event pipeline. These types
//! are the single source of truth across layers: persistence and API. The
//! storage layer treats their field sets as fixed and performs no content
//! validation (coordinate ranges, email format, etc.).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// LOCATION EVENT
// =============================================================================

/// A single geolocation event reported by a device.
///
/// Produced by the application layer; the storage sink never generates or
/// validates the `id`. Immutable once constructed: written once, never
/// updated or deleted downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    /// Event time as UTC epoch seconds, assigned by the reporting device.
    pub timestamp: i64,
    pub device: String,
}

// =============================================================================
// USER ACCOUNT
// =============================================================================

/// Caller-supplied fields for a user registration.
///
/// The row id and creation time are server-side concerns: the storage sink
/// synthesizes both at insert time and they must never be passed through
/// from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
    pub email: String,
    pub phone: String,
}

/// The stored shape of a user account, including the generated fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    /// Server-side creation time as UTC epoch seconds.
    pub creation_time: i64,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
    pub email: String,
    pub phone: String,
}

impl UserRecord {
    /// Materialize a registration into its stored shape, generating the
    /// row id and creation timestamp.
    #[must_use]
    pub fn from_new(user: &NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            creation_time: Utc::now().timestamp(),
            username: user.username.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            password: user.password.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            firstname: "Alice".to_string(),
            lastname: "Liddell".to_string(),
            password: "p@ss".to_string(),
            email: "alice@example.com".to_string(),
            phone: "+1-555-0100".to_string(),
        }
    }

    #[test]
    fn user_record_generates_fresh_identity() {
        let user = sample_user();
        let a = UserRecord::from_new(&user);
        let b = UserRecord::from_new(&user);

        assert_ne!(a.id, b.id);
        assert_eq!(a.username, "alice");
        assert_eq!(a.password, "p@ss");
        assert!(a.creation_time > 0);
    }

    #[test]
    fn location_serde_round_trip() {
        let loc = Location {
            id: "loc-1".to_string(),
            lat: 37.7,
            lng: -122.4,
            timestamp: 1_700_000_000,
            device: "dev-A".to_string(),
        };

        let json = serde_json::to_string(&loc).unwrap();
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(loc, back);
    }
}
