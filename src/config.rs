//! Configuration for the pipeline
//!
//! Externalizes what used to be hard-coded process state: the database path,
//! the four seed-file paths, the load mode, and the run error policy. All
//! fields are optional in the file; `resolve` fills in the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::loader::LoadMode;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClinicConfig {
    pub database: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub dentist_csv: Option<PathBuf>,
    pub patient_csv: Option<PathBuf>,
    pub appointment_csv: Option<PathBuf>,
    pub billing_csv: Option<PathBuf>,
    pub load_mode: Option<LoadMode>,
    pub on_error: Option<ErrorPolicy>,
}

/// What the `run` pipeline does after a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Report the failure and attempt the remaining steps
    #[default]
    Continue,
    /// Stop at the first failed step
    Stop,
}

/// Fully-resolved settings with every default applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub database: PathBuf,
    pub dentist_csv: PathBuf,
    pub patient_csv: PathBuf,
    pub appointment_csv: PathBuf,
    pub billing_csv: PathBuf,
    pub load_mode: LoadMode,
    pub on_error: ErrorPolicy,
}

impl ClinicConfig {
    /// Apply defaults: `clinic.db` for the database, the conventional seed
    /// file names under `data_dir` (or the working directory) for the CSVs.
    pub fn resolve(&self) -> ResolvedConfig {
        let base = self
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let seed = |explicit: &Option<PathBuf>, default: &str| match explicit {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => base.join(p),
            None => base.join(default),
        };

        ResolvedConfig {
            database: self
                .database
                .clone()
                .unwrap_or_else(|| PathBuf::from("clinic.db")),
            dentist_csv: seed(&self.dentist_csv, "dentist.csv"),
            patient_csv: seed(&self.patient_csv, "patient.csv"),
            appointment_csv: seed(&self.appointment_csv, "appointment.csv"),
            billing_csv: seed(&self.billing_csv, "billing.csv"),
            load_mode: self.load_mode.unwrap_or_default(),
            on_error: self.on_error.unwrap_or_default(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("clinicdb.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ClinicConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ClinicConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ClinicConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
