//! Static column registry for the four clinic tables
//!
//! Maps a table name to its ordered, typed insert columns. The bulk loader
//! resolves CSV files against this registry instead of carrying per-table
//! insert statements.

/// Declared type of a registry column, used to coerce raw CSV fields before
/// binding. SQLite's type affinity does not reject malformed values on its
/// own, so coercion happens at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Date,
    Time,
    Decimal,
}

/// A single insert column
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty }
    }
}

/// Ordered insert schema for one table
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    /// Parameterized single-row insert statement for this table
    pub fn insert_sql(&self) -> String {
        let columns: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let params: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            columns.join(", "),
            params.join(", ")
        )
    }
}

pub static DENTIST: TableSchema = TableSchema {
    name: "Dentist",
    columns: &[
        Column::new("dentist_id", ColumnType::Integer),
        Column::new("name", ColumnType::Text),
        Column::new("specialty", ColumnType::Text),
        Column::new("phone_number", ColumnType::Text),
    ],
};

pub static PATIENT: TableSchema = TableSchema {
    name: "Patient",
    columns: &[
        Column::new("patient_id", ColumnType::Integer),
        Column::new("name", ColumnType::Text),
        Column::new("gender", ColumnType::Text),
        Column::new("phone_number", ColumnType::Text),
    ],
};

pub static APPOINTMENT: TableSchema = TableSchema {
    name: "Appointment",
    columns: &[
        Column::new("appointment_id", ColumnType::Integer),
        Column::new("appointment_date", ColumnType::Date),
        Column::new("appointment_time", ColumnType::Time),
        Column::new("patient_id", ColumnType::Integer),
        Column::new("dentist_id", ColumnType::Integer),
    ],
};

pub static BILLING: TableSchema = TableSchema {
    name: "Billing",
    columns: &[
        Column::new("billing_id", ColumnType::Integer),
        Column::new("appointment_id", ColumnType::Integer),
        Column::new("amount", ColumnType::Decimal),
        Column::new("payment_status", ColumnType::Text),
    ],
};

/// All tables in foreign-key dependency order (parents before children)
pub static ALL_TABLES: [&TableSchema; 4] = [&DENTIST, &PATIENT, &APPOINTMENT, &BILLING];

/// Look up a table by name (case-insensitive)
pub fn find_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_table() {
        assert_eq!(find_table("Dentist").unwrap().name, "Dentist");
        assert_eq!(find_table("billing").unwrap().name, "Billing");
        assert!(find_table("Supplier").is_none());
    }

    #[test]
    fn test_insert_sql_shape() {
        let sql = PATIENT.insert_sql();
        assert_eq!(
            sql,
            "INSERT INTO Patient (patient_id, name, gender, phone_number) VALUES (?1, ?2, ?3, ?4)"
        );
    }

    #[test]
    fn test_dependency_order() {
        let names: Vec<&str> = ALL_TABLES.iter().map(|t| t.name).collect();
        assert_eq!(names, ["Dentist", "Patient", "Appointment", "Billing"]);
    }
}
