//! services/api/src/adapters/memory.rs
//!
//! Process-local implementation of every repository port. Rows live in
//! insertion-ordered maps behind a single mutex; ids are assigned sequentially
//! per table starting at 1. Per-owner medication name uniqueness and foreign-key
//! references are enforced here as well, mirroring the SQL constraints.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use timeformed_core::domain::{Medication, Take, Treatment, TreatmentMedication, User};
use timeformed_core::ports::{
    MedicationRepository, PortError, PortResult, TakeRepository, TreatmentMedicationRepository,
    TreatmentRepository, UserRepository,
};

/// One table: rows keyed by id, plus the last id handed out.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn filter(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| keep(row)).cloned().collect()
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Replaces an existing row. Fails when the id was never stored.
    fn replace(&mut self, id: i64, row: T, table: &str) -> PortResult<T> {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row.clone();
                Ok(row)
            }
            None => Err(PortError::NotFound(format!("{} row {} not found", table, id))),
        }
    }

    fn remove(&mut self, id: i64) {
        self.rows.remove(&id);
    }
}

struct Tables {
    users: Table<User>,
    medications: Table<Medication>,
    treatments: Table<Treatment>,
    links: Table<TreatmentMedication>,
    takes: Table<Take>,
}

/// Rejects removing a row that `dependents` rows still point at, as a foreign key would.
fn ensure_unreferenced(table: &str, id: i64, dependents: &[(&str, usize)]) -> PortResult<()> {
    match dependents.iter().find(|(_, count)| *count > 0) {
        Some((child, count)) => Err(PortError::Conflict(format!(
            "{} row {} is still referenced by {} {} row(s)",
            table, id, count, child
        ))),
        None => Ok(()),
    }
}

/// In-memory store implementing all repository ports.
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                users: Table::new(),
                medications: Table::new(),
                treatments: Table::new(),
                links: Table::new(),
                takes: Table::new(),
            }),
        }
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }
}

//=========================================================================================
// Repository Implementations
//=========================================================================================

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<User>> {
        Ok(self.lock()?.users.get(id))
    }

    async fn find_all(&self) -> PortResult<Vec<User>> {
        Ok(self.lock()?.users.all())
    }

    async fn exists_by_email(&self, email: &str) -> PortResult<bool> {
        Ok(self.lock()?.users.rows.values().any(|u| u.email == email))
    }

    /// Email is not unique at this level; the service checks it on create only.
    async fn save(&self, user: User) -> PortResult<User> {
        let mut tables = self.lock()?;
        if user.is_persisted() {
            return tables.users.replace(user.id, user, "users");
        }
        let id = tables.users.next_id();
        let saved = User { id, ..user };
        tables.users.rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, user: User) -> PortResult<()> {
        let mut tables = self.lock()?;
        let meds = tables.medications.filter(|m| m.owner_id == user.id).len();
        let treatments = tables.treatments.filter(|t| t.owner_id == user.id).len();
        ensure_unreferenced("users", user.id, &[("meds", meds), ("treatments", treatments)])?;
        tables.users.remove(user.id);
        Ok(())
    }
}

#[async_trait]
impl MedicationRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Medication>> {
        Ok(self.lock()?.medications.get(id))
    }

    async fn find_all(&self) -> PortResult<Vec<Medication>> {
        Ok(self.lock()?.medications.all())
    }

    async fn find_by_owner_id(&self, owner_id: i64) -> PortResult<Vec<Medication>> {
        Ok(self.lock()?.medications.filter(|m| m.owner_id == owner_id))
    }

    async fn exists_by_owner_and_name(&self, owner_id: i64, name: &str) -> PortResult<bool> {
        Ok(self
            .lock()?
            .medications
            .rows
            .values()
            .any(|m| m.owner_id == owner_id && m.name == name))
    }

    async fn save(&self, medication: Medication) -> PortResult<Medication> {
        let mut tables = self.lock()?;
        let taken = tables.medications.rows.values().any(|m| {
            m.id != medication.id && m.owner_id == medication.owner_id && m.name == medication.name
        });
        if taken {
            return Err(PortError::Conflict(format!(
                "user {} already has a medication named '{}'",
                medication.owner_id, medication.name
            )));
        }
        if medication.is_persisted() {
            return tables
                .medications
                .replace(medication.id, medication, "meds");
        }
        let id = tables.medications.next_id();
        let saved = Medication { id, ..medication };
        tables.medications.rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, medication: Medication) -> PortResult<()> {
        let mut tables = self.lock()?;
        let links = tables.links.filter(|l| l.medication_id == medication.id).len();
        ensure_unreferenced("meds", medication.id, &[("treatment_meds", links)])?;
        tables.medications.remove(medication.id);
        Ok(())
    }
}

#[async_trait]
impl TreatmentRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Treatment>> {
        Ok(self.lock()?.treatments.get(id))
    }

    async fn find_all(&self) -> PortResult<Vec<Treatment>> {
        Ok(self.lock()?.treatments.all())
    }

    async fn find_by_owner_id(&self, owner_id: i64) -> PortResult<Vec<Treatment>> {
        Ok(self.lock()?.treatments.filter(|t| t.owner_id == owner_id))
    }

    async fn save(&self, treatment: Treatment) -> PortResult<Treatment> {
        let mut tables = self.lock()?;
        if treatment.is_persisted() {
            return tables
                .treatments
                .replace(treatment.id, treatment, "treatments");
        }
        let id = tables.treatments.next_id();
        let saved = Treatment { id, ..treatment };
        tables.treatments.rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, treatment: Treatment) -> PortResult<()> {
        let mut tables = self.lock()?;
        let links = tables.links.filter(|l| l.treatment_id == treatment.id).len();
        ensure_unreferenced("treatments", treatment.id, &[("treatment_meds", links)])?;
        tables.treatments.remove(treatment.id);
        Ok(())
    }
}

#[async_trait]
impl TreatmentMedicationRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<TreatmentMedication>> {
        Ok(self.lock()?.links.get(id))
    }

    async fn find_all(&self) -> PortResult<Vec<TreatmentMedication>> {
        Ok(self.lock()?.links.all())
    }

    async fn find_by_treatment_id(
        &self,
        treatment_id: i64,
    ) -> PortResult<Vec<TreatmentMedication>> {
        Ok(self
            .lock()?
            .links
            .filter(|l| l.treatment_id == treatment_id))
    }

    async fn save(&self, link: TreatmentMedication) -> PortResult<TreatmentMedication> {
        let mut tables = self.lock()?;
        if link.is_persisted() {
            return tables.links.replace(link.id, link, "treatment_meds");
        }
        let id = tables.links.next_id();
        let saved = TreatmentMedication { id, ..link };
        tables.links.rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, link: TreatmentMedication) -> PortResult<()> {
        let mut tables = self.lock()?;
        let takes = tables.takes.filter(|t| t.treatment_medication_id == link.id).len();
        ensure_unreferenced("treatment_meds", link.id, &[("takes", takes)])?;
        tables.links.remove(link.id);
        Ok(())
    }
}

#[async_trait]
impl TakeRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> PortResult<Option<Take>> {
        Ok(self.lock()?.takes.get(id))
    }

    async fn find_all(&self) -> PortResult<Vec<Take>> {
        Ok(self.lock()?.takes.all())
    }

    async fn find_by_treatment_medication_id(
        &self,
        treatment_medication_id: i64,
    ) -> PortResult<Vec<Take>> {
        Ok(self
            .lock()?
            .takes
            .filter(|t| t.treatment_medication_id == treatment_medication_id))
    }

    async fn save(&self, take: Take) -> PortResult<Take> {
        let mut tables = self.lock()?;
        if take.is_persisted() {
            return tables.takes.replace(take.id, take, "takes");
        }
        let id = tables.takes.next_id();
        let saved = Take { id, ..take };
        tables.takes.rows.insert(id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, take: Take) -> PortResult<()> {
        self.lock()?.takes.remove(take.id);
        Ok(())
    }
}
