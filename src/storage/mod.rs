//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - Dentist(dentist_id, name, specialty, phone_number)
//! - Patient(patient_id, name, gender, phone_number)
//! - Appointment(appointment_id, appointment_date, appointment_time, patient_id, dentist_id)
//! - Billing(billing_id, appointment_id, amount, payment_status)

pub mod schema;
pub mod sqlite;
pub mod tables;

pub use sqlite::{ClinicStore, DbStats, SchemaReport};
pub use tables::{Column, ColumnType, TableSchema};
