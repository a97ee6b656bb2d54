//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the repository ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, PgPool};
use timeformed_core::domain::{Medication, Take, Treatment, TreatmentMedication, User};
use timeformed_core::ports::{
    MedicationRepository, PortError, PortResult, TakeRepository, TreatmentMedicationRepository,
    TreatmentRepository, UserRepository,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every repository port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Maps a driver error onto the port error. Unique (23505) and foreign-key
/// (23503) violations become `Conflict`.
fn map_db_error(e: sqlx::Error) -> PortError {
    if let Some(db_err) = e.as_database_error() {
        if let Some(code) = db_err.code() {
            if code == "23505" || code == "23503" {
                return PortError::Conflict(db_err.message().to_string());
            }
        }
    }
    PortError::Unexpected(e.to_string())
}

fn missing_row(table: &str, id: i64) -> impl FnOnce(sqlx::Error) -> PortError + '_ {
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} row {} not found", table, id)),
        other => map_db_error(other),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

const USER_COLUMNS: &str = "id, name, email, password_hash, age, created_at, updated_at";
const MED_COLUMNS: &str = "id, name, description, user_id, created_at, updated_at";
const TREATMENT_COLUMNS: &str = "id, name, description, user_id, created_at, updated_at";
const TREATMENT_MED_COLUMNS: &str = "id, treatment_id, med_id, dose, frequency_hours, \
     duration_days, start_hour, created_at, updated_at";
const TAKE_COLUMNS: &str =
    "id, treatment_med_id, scheduled_at, taken_at, was_taken, created_at, updated_at";

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    email: String,
    password_hash: Option<String>,
    age: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            age: self.age,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MedRecord {
    id: i64,
    name: String,
    description: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl MedRecord {
    fn to_domain(self) -> Medication {
        Medication {
            id: self.id,
            name: self.name,
            description: self.description,
            owner_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TreatmentRecord {
    id: i64,
    name: String,
    description: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl TreatmentRecord {
    fn to_domain(self) -> Treatment {
        Treatment {
            id: self.id,
            name: self.name,
            description: self.description,
            owner_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TreatmentMedRecord {
    id: i64,
    treatment_id: i64,
    med_id: i64,
    dose: String,
    frequency_hours: i32,
    duration_days: i32,
    start_hour: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl TreatmentMedRecord {
    fn to_domain(self) -> TreatmentMedication {
        TreatmentMedication {
            id: self.id,
            treatment_id: self.treatment_id,
            medication_id: self.med_id,
            dose: self.dose,
            frequency_hours: self.frequency_hours,
            duration_days: self.duration_days,
            start_hour: self.start_hour,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TakeRecord {
    id: i64,
    treatment_med_id: i64,
    scheduled_at: NaiveDateTime,
    taken_at: Option<NaiveDateTime>,
    was_taken: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl TakeRecord {
    fn to_domain(self) -> Take {
        Take {
            id: self.id,
            treatment_medication_id: self.treatment_med_id,
            scheduled_at: self.scheduled_at,
            taken_at: self.taken_at,
            was_taken: self.was_taken,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//=========================================================================================
// `UserRepository` Implementation
//=========================================================================================

#[async_trait]
impl UserRepository for DbAdapter {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(UserRecord::to_domain))
    }

    async fn find_all(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(UserRecord::to_domain).collect())
    }

    async fn exists_by_email(&self, email: &str) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn save(&self, user: User) -> PortResult<User> {
        let record = if user.is_persisted() {
            sqlx::query_as::<_, UserRecord>(&format!(
                "UPDATE users SET name = $2, email = $3, password_hash = $4, age = $5, \
                 updated_at = now() \
                 WHERE id = $1 RETURNING {USER_COLUMNS}"
            ))
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.age)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_row("users", user.id))?
        } else {
            sqlx::query_as::<_, UserRecord>(&format!(
                "INSERT INTO users (name, email, password_hash, age, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
            ))
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.age)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?
        };
        Ok(record.to_domain())
    }

    async fn delete(&self, user: User) -> PortResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

//=========================================================================================
// `MedicationRepository` Implementation
//=========================================================================================

#[async_trait]
impl MedicationRepository for DbAdapter {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Medication>> {
        let record = sqlx::query_as::<_, MedRecord>(&format!(
            "SELECT {MED_COLUMNS} FROM meds WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(MedRecord::to_domain))
    }

    async fn find_all(&self) -> PortResult<Vec<Medication>> {
        let records = sqlx::query_as::<_, MedRecord>(&format!(
            "SELECT {MED_COLUMNS} FROM meds ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(MedRecord::to_domain).collect())
    }

    async fn find_by_owner_id(&self, owner_id: i64) -> PortResult<Vec<Medication>> {
        let records = sqlx::query_as::<_, MedRecord>(&format!(
            "SELECT {MED_COLUMNS} FROM meds WHERE user_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(MedRecord::to_domain).collect())
    }

    async fn exists_by_owner_and_name(&self, owner_id: i64, name: &str) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM meds WHERE user_id = $1 AND name = $2)",
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn save(&self, medication: Medication) -> PortResult<Medication> {
        let record = if medication.is_persisted() {
            sqlx::query_as::<_, MedRecord>(&format!(
                "UPDATE meds SET name = $2, description = $3, user_id = $4, \
                 updated_at = now() \
                 WHERE id = $1 RETURNING {MED_COLUMNS}"
            ))
            .bind(medication.id)
            .bind(&medication.name)
            .bind(&medication.description)
            .bind(medication.owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_row("meds", medication.id))?
        } else {
            sqlx::query_as::<_, MedRecord>(&format!(
                "INSERT INTO meds (name, description, user_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {MED_COLUMNS}"
            ))
            .bind(&medication.name)
            .bind(&medication.description)
            .bind(medication.owner_id)
            .bind(medication.created_at)
            .bind(medication.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?
        };
        Ok(record.to_domain())
    }

    async fn delete(&self, medication: Medication) -> PortResult<()> {
        sqlx::query("DELETE FROM meds WHERE id = $1")
            .bind(medication.id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

//=========================================================================================
// `TreatmentRepository` Implementation
//=========================================================================================

#[async_trait]
impl TreatmentRepository for DbAdapter {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Treatment>> {
        let record = sqlx::query_as::<_, TreatmentRecord>(&format!(
            "SELECT {TREATMENT_COLUMNS} FROM treatments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(TreatmentRecord::to_domain))
    }

    async fn find_all(&self) -> PortResult<Vec<Treatment>> {
        let records = sqlx::query_as::<_, TreatmentRecord>(&format!(
            "SELECT {TREATMENT_COLUMNS} FROM treatments ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(TreatmentRecord::to_domain).collect())
    }

    async fn find_by_owner_id(&self, owner_id: i64) -> PortResult<Vec<Treatment>> {
        let records = sqlx::query_as::<_, TreatmentRecord>(&format!(
            "SELECT {TREATMENT_COLUMNS} FROM treatments WHERE user_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(TreatmentRecord::to_domain).collect())
    }

    async fn save(&self, treatment: Treatment) -> PortResult<Treatment> {
        let record = if treatment.is_persisted() {
            sqlx::query_as::<_, TreatmentRecord>(&format!(
                "UPDATE treatments SET name = $2, description = $3, user_id = $4, \
                 updated_at = now() \
                 WHERE id = $1 RETURNING {TREATMENT_COLUMNS}"
            ))
            .bind(treatment.id)
            .bind(&treatment.name)
            .bind(&treatment.description)
            .bind(treatment.owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_row("treatments", treatment.id))?
        } else {
            sqlx::query_as::<_, TreatmentRecord>(&format!(
                "INSERT INTO treatments (name, description, user_id, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING {TREATMENT_COLUMNS}"
            ))
            .bind(&treatment.name)
            .bind(&treatment.description)
            .bind(treatment.owner_id)
            .bind(treatment.created_at)
            .bind(treatment.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?
        };
        Ok(record.to_domain())
    }

    async fn delete(&self, treatment: Treatment) -> PortResult<()> {
        sqlx::query("DELETE FROM treatments WHERE id = $1")
            .bind(treatment.id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

//=========================================================================================
// `TreatmentMedicationRepository` Implementation
//=========================================================================================

#[async_trait]
impl TreatmentMedicationRepository for DbAdapter {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<TreatmentMedication>> {
        let record = sqlx::query_as::<_, TreatmentMedRecord>(&format!(
            "SELECT {TREATMENT_MED_COLUMNS} FROM treatment_meds WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(TreatmentMedRecord::to_domain))
    }

    async fn find_all(&self) -> PortResult<Vec<TreatmentMedication>> {
        let records = sqlx::query_as::<_, TreatmentMedRecord>(&format!(
            "SELECT {TREATMENT_MED_COLUMNS} FROM treatment_meds ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records
            .into_iter()
            .map(TreatmentMedRecord::to_domain)
            .collect())
    }

    async fn find_by_treatment_id(
        &self,
        treatment_id: i64,
    ) -> PortResult<Vec<TreatmentMedication>> {
        let records = sqlx::query_as::<_, TreatmentMedRecord>(&format!(
            "SELECT {TREATMENT_MED_COLUMNS} FROM treatment_meds WHERE treatment_id = $1 ORDER BY id"
        ))
        .bind(treatment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records
            .into_iter()
            .map(TreatmentMedRecord::to_domain)
            .collect())
    }

    async fn save(&self, link: TreatmentMedication) -> PortResult<TreatmentMedication> {
        let record = if link.is_persisted() {
            sqlx::query_as::<_, TreatmentMedRecord>(&format!(
                "UPDATE treatment_meds SET treatment_id = $2, med_id = $3, dose = $4, \
                 frequency_hours = $5, duration_days = $6, start_hour = $7, updated_at = now() \
                 WHERE id = $1 RETURNING {TREATMENT_MED_COLUMNS}"
            ))
            .bind(link.id)
            .bind(link.treatment_id)
            .bind(link.medication_id)
            .bind(&link.dose)
            .bind(link.frequency_hours)
            .bind(link.duration_days)
            .bind(&link.start_hour)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_row("treatment_meds", link.id))?
        } else {
            sqlx::query_as::<_, TreatmentMedRecord>(&format!(
                "INSERT INTO treatment_meds (treatment_id, med_id, dose, frequency_hours, \
                 duration_days, start_hour, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {TREATMENT_MED_COLUMNS}"
            ))
            .bind(link.treatment_id)
            .bind(link.medication_id)
            .bind(&link.dose)
            .bind(link.frequency_hours)
            .bind(link.duration_days)
            .bind(&link.start_hour)
            .bind(link.created_at)
            .bind(link.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?
        };
        Ok(record.to_domain())
    }

    async fn delete(&self, link: TreatmentMedication) -> PortResult<()> {
        sqlx::query("DELETE FROM treatment_meds WHERE id = $1")
            .bind(link.id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

//=========================================================================================
// `TakeRepository` Implementation
//=========================================================================================

#[async_trait]
impl TakeRepository for DbAdapter {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Take>> {
        let record = sqlx::query_as::<_, TakeRecord>(&format!(
            "SELECT {TAKE_COLUMNS} FROM takes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(TakeRecord::to_domain))
    }

    async fn find_all(&self) -> PortResult<Vec<Take>> {
        let records = sqlx::query_as::<_, TakeRecord>(&format!(
            "SELECT {TAKE_COLUMNS} FROM takes ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(TakeRecord::to_domain).collect())
    }

    async fn find_by_treatment_medication_id(
        &self,
        treatment_medication_id: i64,
    ) -> PortResult<Vec<Take>> {
        let records = sqlx::query_as::<_, TakeRecord>(&format!(
            "SELECT {TAKE_COLUMNS} FROM takes WHERE treatment_med_id = $1 ORDER BY id"
        ))
        .bind(treatment_medication_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(TakeRecord::to_domain).collect())
    }

    async fn save(&self, take: Take) -> PortResult<Take> {
        let record = if take.is_persisted() {
            sqlx::query_as::<_, TakeRecord>(&format!(
                "UPDATE takes SET treatment_med_id = $2, scheduled_at = $3, taken_at = $4, \
                 was_taken = $5, updated_at = now() WHERE id = $1 RETURNING {TAKE_COLUMNS}"
            ))
            .bind(take.id)
            .bind(take.treatment_medication_id)
            .bind(take.scheduled_at)
            .bind(take.taken_at)
            .bind(take.was_taken)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_row("takes", take.id))?
        } else {
            sqlx::query_as::<_, TakeRecord>(&format!(
                "INSERT INTO takes (treatment_med_id, scheduled_at, taken_at, was_taken, \
                 created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TAKE_COLUMNS}"
            ))
            .bind(take.treatment_medication_id)
            .bind(take.scheduled_at)
            .bind(take.taken_at)
            .bind(take.was_taken)
            .bind(take.created_at)
            .bind(take.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?
        };
        Ok(record.to_domain())
    }

    async fn delete(&self, take: Take) -> PortResult<()> {
        sqlx::query("DELETE FROM takes WHERE id = $1")
            .bind(take.id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}
