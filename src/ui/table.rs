use tabled::{Table, Tabled, settings::Style};

use crate::record::{Dentist, PatientTotal};

#[derive(Tabled)]
struct DentistRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Specialty")]
    specialty: String,
    #[tabled(rename = "Phone")]
    phone: String,
}

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "Patient")]
    patient: i64,
    #[tabled(rename = "Total Billed")]
    total: String,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

/// Render the dentist roster as a terminal table
pub fn dentist_table(dentists: &[Dentist]) -> String {
    if dentists.is_empty() {
        return String::new();
    }

    let rows: Vec<DentistRow> = dentists
        .iter()
        .map(|d| DentistRow {
            id: d.dentist_id,
            name: text(&d.name),
            specialty: text(&d.specialty),
            phone: text(&d.phone_number),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

/// Render the per-patient billing totals as a terminal table
pub fn totals_table(totals: &[PatientTotal]) -> String {
    if totals.is_empty() {
        return String::new();
    }

    let rows: Vec<TotalRow> = totals
        .iter()
        .map(|t| TotalRow {
            patient: t.patient_id,
            total: match t.total_billed {
                Some(amount) => format!("{amount:.2}"),
                None => "-".to_string(),
            },
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}
