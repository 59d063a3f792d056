//! Database schema definitions
//!
//! Four tables in foreign-key dependency order: Dentist and Patient are
//! independent, Appointment references both, Billing references Appointment.

/// SQL to create the Dentist table
pub const CREATE_DENTIST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Dentist (
    dentist_id INTEGER PRIMARY KEY,
    name TEXT,
    specialty TEXT,
    phone_number TEXT,
    UNIQUE (phone_number)
)
"#;

/// SQL to create the Patient table
pub const CREATE_PATIENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Patient (
    patient_id INTEGER PRIMARY KEY,
    name TEXT,
    gender TEXT,
    phone_number TEXT,
    UNIQUE (phone_number)
)
"#;

/// SQL to create the Appointment table
///
/// The four-column UNIQUE constraint is the appointment-slot invariant: the
/// same patient cannot book the same dentist twice at the same date and time.
pub const CREATE_APPOINTMENT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Appointment (
    appointment_id INTEGER PRIMARY KEY,
    appointment_date TEXT NOT NULL,
    appointment_time TEXT NOT NULL,
    patient_id INTEGER,
    dentist_id INTEGER,
    FOREIGN KEY (patient_id) REFERENCES Patient(patient_id),
    FOREIGN KEY (dentist_id) REFERENCES Dentist(dentist_id),
    UNIQUE (patient_id, dentist_id, appointment_date, appointment_time)
)
"#;

/// SQL to create the Billing table
///
/// At most one billing row per appointment; deleting the appointment deletes
/// its billing row.
pub const CREATE_BILLING_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS Billing (
    billing_id INTEGER PRIMARY KEY,
    appointment_id INTEGER NOT NULL,
    amount REAL NOT NULL,
    payment_status TEXT,
    FOREIGN KEY (appointment_id) REFERENCES Appointment(appointment_id) ON DELETE CASCADE,
    UNIQUE (appointment_id)
)
"#;

/// All schema creation statements, in dependency order
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_DENTIST_TABLE,
        CREATE_PATIENT_TABLE,
        CREATE_APPOINTMENT_TABLE,
        CREATE_BILLING_TABLE,
    ]
}
