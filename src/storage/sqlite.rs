//! SQLite storage implementation

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, types::Value};

use crate::Result;
use crate::record::{Appointment, Billing, Dentist, Patient, PatientTotal};

use super::schema;
use super::tables::TableSchema;

/// SQLite-backed storage for the clinic database
pub struct ClinicStore {
    conn: Connection,
}

impl ClinicStore {
    /// Open a database file (creates it if it doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Connection-level settings. SQLite ships with foreign-key enforcement
    /// off; the referential-integrity invariants require it on.
    fn configure(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        Ok(())
    }

    // ========== Schema Operations ==========

    /// Apply every schema statement, each attempted independently.
    ///
    /// A failed statement is logged and recorded in the report; the remaining
    /// statements still run. Safe to re-run: every statement is
    /// `IF NOT EXISTS`.
    pub fn provision_schema(&self) -> SchemaReport {
        let mut report = SchemaReport::default();
        for stmt in schema::all_schema_statements() {
            report.attempted += 1;
            match self.conn.execute(stmt, []) {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    tracing::error!("schema statement failed: {e}");
                    report.failures.push(e.to_string());
                }
            }
        }
        report
    }

    // ========== Row Operations ==========

    /// Insert one row into a registry table. `values` must match the table's
    /// column order.
    pub fn insert_row(&self, table: &TableSchema, values: &[Value]) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(&table.insert_sql())?;
        stmt.execute(rusqlite::params_from_iter(values.iter()))?;
        Ok(())
    }

    /// Delete an appointment by id, returning the number of rows removed.
    /// The schema cascades the delete to any billing row.
    pub fn delete_appointment(&self, appointment_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM Appointment WHERE appointment_id = ?1",
            [appointment_id],
        )?;
        Ok(n)
    }

    /// Count rows in a registry table
    pub fn count_rows(&self, table: &TableSchema) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Read Operations ==========

    /// All dentists in natural storage order
    pub fn all_dentists(&self) -> Result<Vec<Dentist>> {
        let mut stmt = self
            .conn
            .prepare("SELECT dentist_id, name, specialty, phone_number FROM Dentist")?;

        let dentists = stmt
            .query_map([], |row| {
                Ok(Dentist {
                    dentist_id: row.get(0)?,
                    name: row.get(1)?,
                    specialty: row.get(2)?,
                    phone_number: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(dentists)
    }

    /// All patients in natural storage order
    pub fn all_patients(&self) -> Result<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT patient_id, name, gender, phone_number FROM Patient")?;

        let patients = stmt
            .query_map([], |row| {
                Ok(Patient {
                    patient_id: row.get(0)?,
                    name: row.get(1)?,
                    gender: row.get(2)?,
                    phone_number: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(patients)
    }

    /// Get an appointment by id
    pub fn get_appointment(&self, appointment_id: i64) -> Result<Option<Appointment>> {
        self.conn
            .query_row(
                "SELECT appointment_id, appointment_date, appointment_time, patient_id, dentist_id
                 FROM Appointment WHERE appointment_id = ?1",
                [appointment_id],
                |row| {
                    Ok(Appointment {
                        appointment_id: row.get(0)?,
                        appointment_date: row.get(1)?,
                        appointment_time: row.get(2)?,
                        patient_id: row.get(3)?,
                        dentist_id: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get the billing row for an appointment, if any
    pub fn billing_for_appointment(&self, appointment_id: i64) -> Result<Option<Billing>> {
        self.conn
            .query_row(
                "SELECT billing_id, appointment_id, amount, payment_status
                 FROM Billing WHERE appointment_id = ?1",
                [appointment_id],
                |row| {
                    Ok(Billing {
                        billing_id: row.get(0)?,
                        appointment_id: row.get(1)?,
                        amount: row.get(2)?,
                        payment_status: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Number of appointments for one patient
    pub fn appointment_count_for(&self, patient_id: i64) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM Appointment WHERE patient_id = ?1",
            [patient_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Total billed amount across one patient's appointments.
    ///
    /// `None` when the patient has no billed appointments at all; an unbilled
    /// appointment contributes nothing to the sum.
    pub fn total_billed_for(&self, patient_id: i64) -> Result<Option<f64>> {
        let total = self.conn.query_row(
            "SELECT SUM(b.amount)
             FROM Billing b
             WHERE b.appointment_id IN (
                 SELECT a.appointment_id FROM Appointment a WHERE a.patient_id = ?1
             )",
            [patient_id],
            |row| row.get::<_, Option<f64>>(0),
        )?;
        Ok(total)
    }

    /// Billing totals grouped by patient, descending by total.
    ///
    /// Every patient with at least one appointment appears. A patient whose
    /// appointments carry no billing rows gets a NULL total, which SQLite
    /// sorts last under DESC.
    pub fn billing_totals_by_patient(&self) -> Result<Vec<PatientTotal>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.patient_id, SUM(b.amount) AS total_billed
             FROM Appointment a
             LEFT JOIN Billing b ON b.appointment_id = a.appointment_id
             GROUP BY a.patient_id
             ORDER BY total_billed DESC",
        )?;

        let totals = stmt
            .query_map([], |row| {
                Ok(PatientTotal {
                    patient_id: row.get(0)?,
                    total_billed: row.get(1)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(totals)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            dentists: self.count_rows(&super::tables::DENTIST)?,
            patients: self.count_rows(&super::tables::PATIENT)?,
            appointments: self.count_rows(&super::tables::APPOINTMENT)?,
            billing_rows: self.count_rows(&super::tables::BILLING)?,
        })
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction for bulk operations
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit a transaction
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Rollback a transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }
}

/// Outcome of a schema provisioning pass. Statements are attempted
/// independently, so a partial schema shows up here rather than as a single
/// error.
#[derive(Debug, Clone, Default)]
pub struct SchemaReport {
    pub attempted: usize,
    pub applied: usize,
    pub failures: Vec<String>,
}

impl SchemaReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub dentists: usize,
    pub patients: usize,
    pub appointments: usize,
    pub billing_rows: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Dentists: {}", self.dentists)?;
        writeln!(f, "  Patients: {}", self.patients)?;
        writeln!(f, "  Appointments: {}", self.appointments)?;
        writeln!(f, "  Billing rows: {}", self.billing_rows)
    }
}
