//! Clinicdb CLI - provision, load, and report on the dental clinic database

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clinicdb::config::{self, ClinicConfig, ErrorPolicy};
use clinicdb::loader::{BulkLoader, LoadMode, LoadReport};
use clinicdb::record::PatientTotal;
use clinicdb::report::ReportEngine;
use clinicdb::storage::ClinicStore;
use clinicdb::ui::{self, Icons};
use clinicdb::chart;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Exit codes, one per failing step category
const EXIT_CONNECT: u8 = 2;
const EXIT_SCHEMA: u8 = 3;
const EXIT_LOAD: u8 = 4;
const EXIT_QUERY: u8 = 5;
const EXIT_CHART: u8 = 6;

#[derive(Parser)]
#[command(name = "clinicdb")]
#[command(version)]
#[command(about = "Dental clinic schema provisioning, CSV bulk loading, and billing reports")]
#[command(long_about = r#"
Clinicdb provisions the dental clinic schema, bulk-loads the seed CSV files,
runs the billing reports, and renders the per-patient billing chart.

Example usage:
  clinicdb init --database clinic.db
  clinicdb load --table Patient --file patient.csv
  clinicdb report --patient 1021
  clinicdb run --data-dir ./seed
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and provision the schema
    Init {
        /// Path to the database file
        #[arg(short, long, default_value = "clinic.db")]
        database: PathBuf,

        /// Also write a starter clinicdb.toml
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing clinicdb.toml
        #[arg(long)]
        force: bool,
    },

    /// Load one CSV file into a table
    Load {
        /// Target table (Dentist, Patient, Appointment, Billing)
        #[arg(short, long)]
        table: String,

        /// Path to the CSV file (header row required)
        #[arg(short, long)]
        file: PathBuf,

        /// Path to the database file
        #[arg(short, long, default_value = "clinic.db")]
        database: PathBuf,

        /// Failure handling: atomic or best-effort
        #[arg(short, long, default_value = "atomic")]
        mode: String,
    },

    /// Run the reporting queries
    Report {
        /// Path to the database file
        #[arg(short, long, default_value = "clinic.db")]
        database: PathBuf,

        /// Patient id for the count and total queries
        #[arg(short, long, default_value = "1021")]
        patient: i64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Render the per-patient billing bar chart
    Chart {
        /// Path to the database file
        #[arg(short, long, default_value = "clinic.db")]
        database: PathBuf,

        /// Path of the SVG file to write
        #[arg(short, long, default_value = "billing.svg")]
        output: PathBuf,
    },

    /// Provision, load every seed file, report, and chart in one pass
    Run {
        /// Path to clinicdb.toml (defaults to ./clinicdb.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Path to the database file (overrides the config)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Directory holding the seed CSV files (overrides the config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Patient id for the count and total queries
        #[arg(short, long, default_value = "1021")]
        patient: i64,

        /// Path of the SVG chart to write
        #[arg(short, long, default_value = "billing.svg")]
        output: PathBuf,

        /// Stop at the first failed step instead of continuing
        #[arg(long)]
        fail_fast: bool,
    },

    /// Show row counts for the four tables
    Stats {
        /// Path to the database file
        #[arg(short, long, default_value = "clinic.db")]
        database: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match dispatch(cli.command) {
        Ok(code) => code,
        Err(e) => {
            ui::error(&format!("{e:#}"));
            ExitCode::from(1)
        }
    }
}

fn fail(context: &str, error: impl std::fmt::Display, code: u8) -> anyhow::Result<ExitCode> {
    ui::error(&format!("{context}: {error}"));
    Ok(ExitCode::from(code))
}

fn open_store(database: &Path) -> Result<ClinicStore, clinicdb::Error> {
    config::ensure_db_dir(database).map_err(|e| clinicdb::Error::Config(e.to_string()))?;
    ClinicStore::open(database)
}

fn dispatch(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Init { database, write_config, force } => {
            let store = match open_store(&database) {
                Ok(s) => s,
                Err(e) => return fail("Cannot open database", e, EXIT_CONNECT),
            };

            let report = store.provision_schema();
            if !report.is_complete() {
                for failure in &report.failures {
                    ui::error(failure);
                }
                return fail(
                    "Schema incomplete",
                    format!("{}/{} statements applied", report.applied, report.attempted),
                    EXIT_SCHEMA,
                );
            }
            ui::status(Icons::DATABASE, "Database", &database.display().to_string());
            ui::success(&format!("Schema ready ({} statements)", report.applied));

            if write_config {
                let path = config::default_config_path();
                let starter = ClinicConfig {
                    database: Some(database.clone()),
                    data_dir: Some(PathBuf::from(".")),
                    ..Default::default()
                };
                config::write_config(&path, &starter, force)?;
                ui::info("Config written", &path.display().to_string());
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Load { table, file, database, mode } => {
            let mode = LoadMode::from_str(&mode)?;
            let mut store = match open_store(&database) {
                Ok(s) => s,
                Err(e) => return fail("Cannot open database", e, EXIT_CONNECT),
            };

            let mut loader = BulkLoader::with_mode(&mut store, mode);
            match loader.load(&table, &file) {
                Ok(report) => {
                    print_load_report(&report);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => fail(&format!("Load of `{table}` failed"), e, EXIT_LOAD),
            }
        }

        Commands::Report { database, patient, format } => {
            let store = match open_store(&database) {
                Ok(s) => s,
                Err(e) => return fail("Cannot open database", e, EXIT_CONNECT),
            };
            let engine = ReportEngine::new(&store);

            if format == "json" {
                let report = match build_json_report(&engine, patient) {
                    Ok(value) => value,
                    Err(e) => return fail("Query failed", e, EXIT_QUERY),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(ExitCode::SUCCESS);
            }

            match print_text_report(&engine, patient) {
                Ok(_) => Ok(ExitCode::SUCCESS),
                Err(e) => fail("Query failed", e, EXIT_QUERY),
            }
        }

        Commands::Chart { database, output } => {
            let store = match open_store(&database) {
                Ok(s) => s,
                Err(e) => return fail("Cannot open database", e, EXIT_CONNECT),
            };

            let totals = match ReportEngine::new(&store).totals_by_patient() {
                Ok(totals) => totals,
                Err(e) => return fail("Query failed", e, EXIT_QUERY),
            };

            match chart::render_billing_chart(&totals, &output) {
                Ok(()) => {
                    ui::status(Icons::CHART, "Chart", &output.display().to_string());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => fail("Chart render failed", e, EXIT_CHART),
            }
        }

        Commands::Run { config: config_path, database, data_dir, patient, output, fail_fast } => {
            let mut cfg = config::load_config(config_path.as_deref())?.unwrap_or_default();
            if let Some(db) = database {
                cfg.database = Some(db);
            }
            if let Some(dir) = data_dir {
                cfg.data_dir = Some(dir);
            }
            if fail_fast {
                cfg.on_error = Some(ErrorPolicy::Stop);
            }
            run_pipeline(cfg.resolve(), patient, &output)
        }

        Commands::Stats { database } => {
            let store = match open_store(&database) {
                Ok(s) => s,
                Err(e) => return fail("Cannot open database", e, EXIT_CONNECT),
            };
            let stats = store.stats()?;
            ui::status(Icons::STATS, "Database", &database.display().to_string());
            println!("{stats}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// The full documented pipeline: schema, four loads in dependency order, the
/// reporting queries, one chart. Steps are isolated: under the default
/// continue policy a failed step is recorded and the rest still run; the exit
/// code is the first failure's.
fn run_pipeline(
    settings: config::ResolvedConfig,
    patient: i64,
    chart_output: &Path,
) -> anyhow::Result<ExitCode> {
    ui::header("Dental clinic pipeline");
    ui::info("Database", &settings.database.display().to_string());

    let mut store = match open_store(&settings.database) {
        Ok(s) => s,
        Err(e) => return fail("Cannot open database", e, EXIT_CONNECT),
    };

    let stop_on_error = settings.on_error == ErrorPolicy::Stop;
    let mut first_failure: Option<u8> = None;

    // Step 1: schema
    ui::status(Icons::GEAR, "Step", "provision schema");
    let schema_report = store.provision_schema();
    if schema_report.is_complete() {
        ui::success(&format!("Schema ready ({} statements)", schema_report.applied));
    } else {
        for failure in &schema_report.failures {
            ui::error(failure);
        }
        first_failure.get_or_insert(EXIT_SCHEMA);
        if stop_on_error {
            return Ok(ExitCode::from(EXIT_SCHEMA));
        }
    }

    // Step 2: loads, parents before children
    let seeds: [(&str, &Path); 4] = [
        ("Dentist", &settings.dentist_csv),
        ("Patient", &settings.patient_csv),
        ("Appointment", &settings.appointment_csv),
        ("Billing", &settings.billing_csv),
    ];
    for (table, source) in seeds {
        ui::status(Icons::FILE, "Step", &format!("load {table} from {}", source.display()));
        let mut loader = BulkLoader::with_mode(&mut store, settings.load_mode);
        match loader.load(table, source) {
            Ok(report) => print_load_report(&report),
            Err(e) => {
                ui::error(&format!("Load of `{table}` failed: {e}"));
                first_failure.get_or_insert(EXIT_LOAD);
                if stop_on_error {
                    return Ok(ExitCode::from(EXIT_LOAD));
                }
            }
        }
    }

    // Step 3: reporting queries. The grouped totals feed the chart directly.
    ui::status(Icons::STATS, "Step", "reporting queries");
    let engine = ReportEngine::new(&store);
    let totals = match print_text_report(&engine, patient) {
        Ok(totals) => totals,
        Err(e) => {
            ui::error(&format!("Query failed: {e}"));
            first_failure.get_or_insert(EXIT_QUERY);
            if stop_on_error {
                return Ok(ExitCode::from(EXIT_QUERY));
            }
            Vec::new()
        }
    };

    // Step 4: chart
    ui::status(Icons::CHART, "Step", &format!("render chart to {}", chart_output.display()));
    match chart::render_billing_chart(&totals, chart_output) {
        Ok(()) => ui::success("Chart rendered"),
        Err(e) => {
            ui::error(&format!("Chart render failed: {e}"));
            first_failure.get_or_insert(EXIT_CHART);
        }
    }

    match first_failure {
        None => {
            ui::success("Pipeline complete");
            Ok(ExitCode::SUCCESS)
        }
        Some(code) => {
            ui::warn("Pipeline finished with failures");
            Ok(ExitCode::from(code))
        }
    }
}

fn print_load_report(report: &LoadReport) {
    if report.rows_skipped > 0 {
        ui::warn(&format!(
            "Loaded {} of {} rows into {} ({} skipped)",
            report.rows_inserted, report.rows_attempted, report.table, report.rows_skipped
        ));
    } else {
        ui::success(&format!(
            "Loaded {} rows into {}",
            report.rows_inserted, report.table
        ));
    }
}

/// Print the four reports; returns the grouped totals so the pipeline can
/// hand the same result to the chart renderer.
fn print_text_report(engine: &ReportEngine, patient: i64) -> clinicdb::Result<Vec<PatientTotal>> {
    ui::section("Dentists");
    let dentists = engine.all_dentists()?;
    if dentists.is_empty() {
        println!("{}", ui::dim("no dentists on record"));
    } else {
        println!("{}", ui::dentist_table(&dentists));
    }

    ui::section(&format!("Patient {patient}"));
    let summary = engine.patient_summary(patient)?;
    ui::summary_row("Appointments:", &summary.appointments.to_string());
    let total = match summary.total_billed {
        Some(amount) => format!("{amount:.2}"),
        None => "none billed".to_string(),
    };
    ui::summary_row("Total billed:", &total);

    ui::section("Total billing per patient");
    let totals = engine.totals_by_patient()?;
    if totals.is_empty() {
        println!("{}", ui::dim("no appointments on record"));
    } else {
        println!("{}", ui::totals_table(&totals));
    }

    Ok(totals)
}

fn build_json_report(engine: &ReportEngine, patient: i64) -> clinicdb::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "dentists": engine.all_dentists()?,
        "patient": engine.patient_summary(patient)?,
        "totals_by_patient": engine.totals_by_patient()?,
    }))
}
