//! crates/timeformed_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.
//!
//! Relationships are plain foreign-key ids. Following one is always an explicit
//! repository call that returns a value snapshot, never a live object graph.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Surrogate id of an entity that has not been persisted yet.
/// The store assigns the real id on first save.
pub const UNSAVED_ID: i64 = 0;

/// A registered person. Owns medications and treatments.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Checked for uniqueness on registration only.
    pub email: String,
    /// Argon2 PHC string. `None` when the account was created without a password.
    pub password_hash: Option<String>,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A medication in a user's personal catalog.
/// `(owner_id, name)` is unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Medication {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A prescription owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Treatment {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Links a medication into a treatment with its dosing schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentMedication {
    pub id: i64,
    pub treatment_id: i64,
    pub medication_id: i64,
    /// Free text, e.g. "500mg".
    pub dose: String,
    pub frequency_hours: i32,
    pub duration_days: i32,
    /// 24h wall-clock time of the first dose, e.g. "08:00".
    pub start_hour: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scheduled or administered dose of a treatment-medication link.
///
/// `taken_at` stays `None` until the dose is administered. `was_taken` is
/// recorded independently of whether `taken_at` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Take {
    pub id: i64,
    pub treatment_medication_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub taken_at: Option<NaiveDateTime>,
    pub was_taken: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

macro_rules! impl_persisted {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl $entity {
                /// Whether the store has already assigned this entity an id.
                pub fn is_persisted(&self) -> bool {
                    self.id != UNSAVED_ID
                }
            }
        )+
    };
}

impl_persisted!(User, Medication, Treatment, TreatmentMedication, Take);
