//! Bulk Loader - CSV ingestion into the clinic tables
//!
//! Reads a delimited file, consumes its header row, coerces every field
//! against the column registry, and inserts the remaining rows into the named
//! target table.

use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::storage::ClinicStore;
use crate::storage::tables::{self, Column, ColumnType, TableSchema};
use crate::{Error, Result};

/// Failure handling for one load call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadMode {
    /// All rows of the call in one transaction; the first row failure rolls
    /// everything back and nothing persists.
    #[default]
    Atomic,
    /// Rows commit individually; failed rows are logged, counted, and skipped.
    BestEffort,
}

impl std::str::FromStr for LoadMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "atomic" => Ok(LoadMode::Atomic),
            "best-effort" | "best_effort" => Ok(LoadMode::BestEffort),
            _ => Err(Error::Config(format!(
                "unknown load mode `{s}` (expected `atomic` or `best-effort`)"
            ))),
        }
    }
}

/// Typed outcome of one load call
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub table: &'static str,
    pub rows_attempted: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
}

impl LoadReport {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            rows_attempted: 0,
            rows_inserted: 0,
            rows_skipped: 0,
        }
    }
}

/// CSV-to-table loader over a clinic store
pub struct BulkLoader<'a> {
    store: &'a mut ClinicStore,
    mode: LoadMode,
}

impl<'a> BulkLoader<'a> {
    /// Create a loader with the default atomic mode
    pub fn new(store: &'a mut ClinicStore) -> Self {
        Self::with_mode(store, LoadMode::Atomic)
    }

    pub fn with_mode(store: &'a mut ClinicStore, mode: LoadMode) -> Self {
        Self { store, mode }
    }

    /// Load one CSV file into the named table.
    ///
    /// The first row of the file is the header and is never inserted. A table
    /// name outside the registry is an error, not a silent no-op.
    pub fn load(&mut self, table_name: &str, source: &Path) -> Result<LoadReport> {
        let table = tables::find_table(table_name)
            .ok_or_else(|| Error::UnsupportedTable(table_name.to_string()))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_path(source)?;

        tracing::info!("loading `{}` from {}", table.name, source.display());

        match self.mode {
            LoadMode::Atomic => self.load_atomic(table, &mut reader),
            LoadMode::BestEffort => self.load_best_effort(table, &mut reader),
        }
    }

    fn load_atomic(
        &mut self,
        table: &'static TableSchema,
        reader: &mut csv::Reader<std::fs::File>,
    ) -> Result<LoadReport> {
        let mut report = LoadReport::new(table.name);
        self.store.begin_transaction()?;

        for (idx, record) in reader.records().enumerate() {
            let row = idx + 1;
            report.rows_attempted += 1;
            if let Err(e) = self.insert_record(table, record, row) {
                if let Err(rb) = self.store.rollback() {
                    tracing::error!("rollback after failed load of `{}`: {rb}", table.name);
                }
                return Err(e);
            }
            report.rows_inserted += 1;
        }

        self.store.commit()?;
        Ok(report)
    }

    fn load_best_effort(
        &mut self,
        table: &'static TableSchema,
        reader: &mut csv::Reader<std::fs::File>,
    ) -> Result<LoadReport> {
        let mut report = LoadReport::new(table.name);

        for (idx, record) in reader.records().enumerate() {
            let row = idx + 1;
            report.rows_attempted += 1;
            match self.insert_record(table, record, row) {
                Ok(()) => report.rows_inserted += 1,
                Err(e) => {
                    tracing::warn!("skipping row: {e}");
                    report.rows_skipped += 1;
                }
            }
        }

        Ok(report)
    }

    fn insert_record(
        &mut self,
        table: &'static TableSchema,
        record: csv::Result<StringRecord>,
        row: usize,
    ) -> Result<()> {
        let record = record?;
        let values = coerce_row(table, &record, row)?;
        self.store.insert_row(table, &values).map_err(|e| match e {
            Error::Storage(source) => Error::RowInsert {
                table: table.name,
                row,
                source,
            },
            other => other,
        })
    }
}

/// Coerce one CSV record into bind values matching the table's column order
fn coerce_row(
    table: &'static TableSchema,
    record: &StringRecord,
    row: usize,
) -> Result<Vec<Value>> {
    if record.len() != table.columns.len() {
        return Err(Error::RowShape {
            table: table.name,
            row,
            expected: table.columns.len(),
            got: record.len(),
        });
    }

    table
        .columns
        .iter()
        .zip(record.iter())
        .map(|(column, raw)| coerce_field(table.name, column, raw, row))
        .collect()
}

/// Coerce one raw field per its declared column type. Empty fields bind NULL.
fn coerce_field(table: &'static str, column: &Column, raw: &str, row: usize) -> Result<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }

    let malformed = || Error::MalformedField {
        table,
        column: column.name,
        row,
        value: raw.to_string(),
    };

    let value = match column.ty {
        ColumnType::Integer => Value::Integer(raw.parse::<i64>().map_err(|_| malformed())?),
        ColumnType::Text => Value::Text(raw.to_string()),
        ColumnType::Date => {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| malformed())?;
            Value::Text(raw.to_string())
        }
        ColumnType::Time => {
            let time = NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                .map_err(|_| malformed())?;
            Value::Text(time.format("%H:%M:%S").to_string())
        }
        ColumnType::Decimal => Value::Real(raw.parse::<f64>().map_err(|_| malformed())?),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Patient;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn provisioned_store() -> ClinicStore {
        let store = ClinicStore::open_in_memory().unwrap();
        assert!(store.provision_schema().is_complete());
        store
    }

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_patient_round_trip() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            "patient.csv",
            "patient_id,name,gender,phone_number\n\
             1021,Alice Moreau,F,555-0100\n\
             1022,Ben Okafor,M,555-0101\n\
             1023,Cora Lindh,F,555-0102\n",
        );

        let mut store = provisioned_store();
        let report = BulkLoader::new(&mut store).load("Patient", &csv).unwrap();
        assert_eq!(report.rows_attempted, 3);
        assert_eq!(report.rows_inserted, 3);
        assert_eq!(report.rows_skipped, 0);

        let patients = store.all_patients().unwrap();
        assert_eq!(
            patients,
            vec![
                Patient {
                    patient_id: 1021,
                    name: Some("Alice Moreau".into()),
                    gender: Some("F".into()),
                    phone_number: Some("555-0100".into()),
                },
                Patient {
                    patient_id: 1022,
                    name: Some("Ben Okafor".into()),
                    gender: Some("M".into()),
                    phone_number: Some("555-0101".into()),
                },
                Patient {
                    patient_id: 1023,
                    name: Some("Cora Lindh".into()),
                    gender: Some("F".into()),
                    phone_number: Some("555-0102".into()),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(&dir, "supplier.csv", "id,name\n1,Acme\n");

        let mut store = provisioned_store();
        let err = BulkLoader::new(&mut store).load("Supplier", &csv).unwrap_err();
        assert!(matches!(err, Error::UnsupportedTable(ref t) if t == "Supplier"));

        let stats = store.stats().unwrap();
        assert_eq!(stats.dentists + stats.patients + stats.appointments + stats.billing_rows, 0);
    }

    #[test]
    fn test_atomic_malformed_field_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            "patient.csv",
            "patient_id,name,gender,phone_number\n\
             1021,Alice Moreau,F,555-0100\n\
             not-a-number,Ben Okafor,M,555-0101\n\
             1023,Cora Lindh,F,555-0102\n",
        );

        let mut store = provisioned_store();
        let err = BulkLoader::new(&mut store).load("Patient", &csv).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedField { column: "patient_id", row: 2, .. }
        ));
        assert_eq!(store.all_patients().unwrap().len(), 0);
    }

    #[test]
    fn test_atomic_constraint_violation_rolls_back() {
        let dir = TempDir::new().unwrap();
        // Rows 1 and 3 collide on phone_number
        let csv = write_csv(
            &dir,
            "patient.csv",
            "patient_id,name,gender,phone_number\n\
             1021,Alice Moreau,F,555-0100\n\
             1022,Ben Okafor,M,555-0101\n\
             1023,Cora Lindh,F,555-0100\n",
        );

        let mut store = provisioned_store();
        let err = BulkLoader::new(&mut store).load("Patient", &csv).unwrap_err();
        assert!(matches!(err, Error::RowInsert { table: "Patient", row: 3, .. }));
        assert_eq!(store.all_patients().unwrap().len(), 0);
    }

    #[test]
    fn test_best_effort_skips_bad_rows() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            "patient.csv",
            "patient_id,name,gender,phone_number\n\
             1021,Alice Moreau,F,555-0100\n\
             not-a-number,Ben Okafor,M,555-0101\n\
             1023,Cora Lindh,F,555-0102\n",
        );

        let mut store = provisioned_store();
        let report = BulkLoader::with_mode(&mut store, LoadMode::BestEffort)
            .load("Patient", &csv)
            .unwrap();
        assert_eq!(report.rows_attempted, 3);
        assert_eq!(report.rows_inserted, 2);
        assert_eq!(report.rows_skipped, 1);
        assert_eq!(store.all_patients().unwrap().len(), 2);
    }

    #[test]
    fn test_full_dependency_order_load() {
        let dir = TempDir::new().unwrap();
        let dentists = write_csv(
            &dir,
            "dentist.csv",
            "dentist_id,name,specialty,phone_number\n\
             1,Dr. Chen,Orthodontics,555-0001\n\
             2,Dr. Patel,Endodontics,555-0002\n",
        );
        let patients = write_csv(
            &dir,
            "patient.csv",
            "patient_id,name,gender,phone_number\n\
             1021,Alice Moreau,F,555-0100\n",
        );
        // Second appointment uses an HH:MM time, normalized on the way in
        let appointments = write_csv(
            &dir,
            "appointment.csv",
            "appointment_id,appointment_date,appointment_time,patient_id,dentist_id\n\
             500,2024-03-01,10:00:00,1021,1\n\
             501,2024-03-08,14:30,1021,2\n",
        );
        let billing = write_csv(
            &dir,
            "billing.csv",
            "billing_id,appointment_id,amount,payment_status\n\
             9000,500,50.00,Paid\n",
        );

        let mut store = provisioned_store();
        let mut loader = BulkLoader::new(&mut store);
        loader.load("Dentist", &dentists).unwrap();
        loader.load("Patient", &patients).unwrap();
        loader.load("Appointment", &appointments).unwrap();
        loader.load("Billing", &billing).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.dentists, 2);
        assert_eq!(stats.patients, 1);
        assert_eq!(stats.appointments, 2);
        assert_eq!(stats.billing_rows, 1);

        let normalized = store.get_appointment(501).unwrap().unwrap();
        assert_eq!(normalized.appointment_time, "14:30:00");
    }

    #[test]
    fn test_load_mode_parsing() {
        assert_eq!("atomic".parse::<LoadMode>().unwrap(), LoadMode::Atomic);
        assert_eq!("best-effort".parse::<LoadMode>().unwrap(), LoadMode::BestEffort);
        assert!("chaotic".parse::<LoadMode>().is_err());
    }
}
