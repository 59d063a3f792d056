//! Reporting queries
//!
//! Four fixed read-only operations over the loaded tables:
//! - the full dentist roster
//! - appointment count for one patient
//! - total billed amount for one patient
//! - billing totals grouped by patient, descending

use serde::Serialize;

use crate::Result;
use crate::record::{Dentist, PatientTotal};
use crate::storage::ClinicStore;

/// Appointment count and billing total for a single patient
#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub patient_id: i64,
    pub appointments: i64,
    pub total_billed: Option<f64>,
}

/// Read-only query engine over the clinic store
pub struct ReportEngine<'a> {
    store: &'a ClinicStore,
}

impl<'a> ReportEngine<'a> {
    /// Create a new report engine
    pub fn new(store: &'a ClinicStore) -> Self {
        Self { store }
    }

    /// Every dentist, in natural storage order
    pub fn all_dentists(&self) -> Result<Vec<Dentist>> {
        self.store.all_dentists()
    }

    /// Number of appointments for one patient
    pub fn appointment_count(&self, patient_id: i64) -> Result<i64> {
        self.store.appointment_count_for(patient_id)
    }

    /// Total billed amount across one patient's appointments.
    /// `None` when the patient has no billed appointments.
    pub fn total_billed(&self, patient_id: i64) -> Result<Option<f64>> {
        self.store.total_billed_for(patient_id)
    }

    /// Appointment count and billing total for one patient in a single result
    pub fn patient_summary(&self, patient_id: i64) -> Result<PatientSummary> {
        Ok(PatientSummary {
            patient_id,
            appointments: self.appointment_count(patient_id)?,
            total_billed: self.total_billed(patient_id)?,
        })
    }

    /// Billing totals grouped by patient, descending by total. Patients with
    /// appointments but no billing appear with a `None` total, after the rest.
    pub fn totals_by_patient(&self) -> Result<Vec<PatientTotal>> {
        self.store.billing_totals_by_patient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tables;
    use rusqlite::types::Value;

    fn store() -> ClinicStore {
        let store = ClinicStore::open_in_memory().unwrap();
        assert!(store.provision_schema().is_complete());
        store.insert_row(
            &tables::DENTIST,
            &[
                Value::Integer(1),
                Value::Text("Dr. Chen".into()),
                Value::Text("Orthodontics".into()),
                Value::Text("555-0001".into()),
            ],
        )
        .unwrap();
        store
    }

    fn add_patient(store: &ClinicStore, id: i64) {
        store
            .insert_row(
                &tables::PATIENT,
                &[
                    Value::Integer(id),
                    Value::Text(format!("Patient {id}")),
                    Value::Text("F".into()),
                    Value::Text(format!("555-0{id}")),
                ],
            )
            .unwrap();
    }

    fn add_appointment(store: &ClinicStore, id: i64, patient: i64, time: &str) {
        store
            .insert_row(
                &tables::APPOINTMENT,
                &[
                    Value::Integer(id),
                    Value::Text("2024-03-01".into()),
                    Value::Text(time.into()),
                    Value::Integer(patient),
                    Value::Integer(1),
                ],
            )
            .unwrap();
    }

    fn add_billing(store: &ClinicStore, id: i64, appointment: i64, amount: f64) {
        store
            .insert_row(
                &tables::BILLING,
                &[
                    Value::Integer(id),
                    Value::Integer(appointment),
                    Value::Real(amount),
                    Value::Text("Paid".into()),
                ],
            )
            .unwrap();
    }

    #[test]
    fn test_dentist_roster() {
        let store = store();
        let engine = ReportEngine::new(&store);
        let dentists = engine.all_dentists().unwrap();
        assert_eq!(dentists.len(), 1);
        assert_eq!(dentists[0].name.as_deref(), Some("Dr. Chen"));
    }

    #[test]
    fn test_appointment_count() {
        let store = store();
        add_patient(&store, 1021);
        add_appointment(&store, 500, 1021, "10:00:00");
        add_appointment(&store, 501, 1021, "11:00:00");

        let engine = ReportEngine::new(&store);
        assert_eq!(engine.appointment_count(1021).unwrap(), 2);
        assert_eq!(engine.appointment_count(9999).unwrap(), 0);
    }

    #[test]
    fn test_total_ignores_unbilled_appointments() {
        let store = store();
        add_patient(&store, 1021);
        add_appointment(&store, 500, 1021, "10:00:00");
        add_appointment(&store, 501, 1021, "11:00:00");
        // Only the first appointment is billed
        add_billing(&store, 9000, 500, 50.0);

        let engine = ReportEngine::new(&store);
        assert_eq!(engine.total_billed(1021).unwrap(), Some(50.0));
    }

    #[test]
    fn test_total_is_none_without_billing() {
        let store = store();
        add_patient(&store, 1021);
        add_appointment(&store, 500, 1021, "10:00:00");

        let engine = ReportEngine::new(&store);
        assert_eq!(engine.total_billed(1021).unwrap(), None);
    }

    #[test]
    fn test_patient_summary() {
        let store = store();
        add_patient(&store, 1021);
        add_appointment(&store, 500, 1021, "10:00:00");
        add_billing(&store, 9000, 500, 50.0);

        let summary = ReportEngine::new(&store).patient_summary(1021).unwrap();
        assert_eq!(summary.appointments, 1);
        assert_eq!(summary.total_billed, Some(50.0));
    }

    #[test]
    fn test_totals_by_patient_ordering() {
        let store = store();
        // A: two appointments billed 30 and 20, B: one appointment billed 100
        add_patient(&store, 1);
        add_patient(&store, 2);
        add_appointment(&store, 500, 1, "10:00:00");
        add_appointment(&store, 501, 1, "11:00:00");
        add_appointment(&store, 502, 2, "12:00:00");
        add_billing(&store, 9000, 500, 30.0);
        add_billing(&store, 9001, 501, 20.0);
        add_billing(&store, 9002, 502, 100.0);

        let totals = ReportEngine::new(&store).totals_by_patient().unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].patient_id, 2);
        assert_eq!(totals[0].total_billed, Some(100.0));
        assert_eq!(totals[1].patient_id, 1);
        assert_eq!(totals[1].total_billed, Some(50.0));
    }

    #[test]
    fn test_unbilled_patient_appears_with_null_total() {
        let store = store();
        add_patient(&store, 1);
        add_patient(&store, 2);
        add_appointment(&store, 500, 1, "10:00:00");
        add_appointment(&store, 501, 2, "11:00:00");
        add_billing(&store, 9000, 500, 60.0);

        let totals = ReportEngine::new(&store).totals_by_patient().unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].patient_id, 1);
        assert_eq!(totals[0].total_billed, Some(60.0));
        // Patient 2 has an appointment but no billing: present, NULL, last
        assert_eq!(totals[1].patient_id, 2);
        assert_eq!(totals[1].total_billed, None);
    }
}
