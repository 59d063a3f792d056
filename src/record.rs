//! Domain row types for the four clinic tables

use serde::Serialize;

/// A Dentist row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dentist {
    pub dentist_id: i64,
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub phone_number: Option<String>,
}

/// A Patient row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Patient {
    pub patient_id: i64,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
}

/// An Appointment row
///
/// Date and time are kept in their canonical storage form (`YYYY-MM-DD`,
/// `HH:MM:SS`); the loader validates them on the way in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub appointment_id: i64,
    pub appointment_date: String,
    pub appointment_time: String,
    pub patient_id: Option<i64>,
    pub dentist_id: Option<i64>,
}

/// A Billing row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Billing {
    pub billing_id: i64,
    pub appointment_id: i64,
    pub amount: f64,
    pub payment_status: Option<String>,
}

/// One entry of the per-patient billing totals report
///
/// `total_billed` is `None` for a patient who has appointments but no billing
/// rows at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientTotal {
    pub patient_id: i64,
    pub total_billed: Option<f64>,
}
