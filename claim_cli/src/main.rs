use chrono::{DateTime, Utc};
use claim_core::criteria;
use claim_core::profile::PROFILES_FILE;
use claim_core::*;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "vclaim")]
#[command(about = "VA disability condition evidence analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a symptom occurrence
    Log {
        /// Symptom id, e.g. migraine or back-pain
        symptom: String,

        /// Severity on the 0-10 scale
        #[arg(long)]
        severity: Option<f64>,

        /// When it happened (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Extra detail as key=value; values are read as JSON when possible
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a measurement such as blood pressure
    Measure {
        /// Measurement type, e.g. blood-pressure or hba1c
        measurement_type: String,

        /// Reading as key=number, e.g. systolic=150
        #[arg(long = "value", value_name = "KEY=NUMBER", required = true)]
        values: Vec<String>,

        #[arg(long)]
        at: Option<String>,

        #[arg(long = "meta", value_name = "KEY=VALUE")]
        meta: Vec<String>,
    },

    /// Import a JSON export from the logging app
    Import {
        file: PathBuf,
    },

    /// Show or edit condition profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Analyze logged evidence against the rating criteria
    Analyze {
        /// Only this diagnostic code
        #[arg(long)]
        code: Option<String>,

        #[command(flatten)]
        window: WindowArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Count conditions with data per body system
    Summary {
        #[command(flatten)]
        window: WindowArgs,

        #[arg(long)]
        json: bool,
    },

    /// List the diagnostic codes the analyzer knows
    Conditions {
        /// Only conditions tracking one of your chronic symptoms
        #[arg(long)]
        chronic: bool,
    },

    /// Write analysis results to a CSV file
    Export {
        output: PathBuf,

        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print profiles as JSON
    Show {
        code: Option<String>,
    },
    /// Update fields of a profile, creating it if needed
    Set {
        code: String,

        #[arg(long)]
        diagnosed: Option<bool>,

        #[arg(long)]
        breathing_device: Option<bool>,

        #[arg(long)]
        device_type: Option<String>,
    },
    /// Remove a profile
    Clear {
        code: String,
    },
}

#[derive(Args)]
struct WindowArgs {
    /// Evaluation period in days
    #[arg(long)]
    days: Option<u32>,

    /// End of the evaluation period (RFC 3339 or YYYY-MM-DD); defaults to now
    #[arg(long)]
    as_of: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    claim_core::logging::init_with_level(claim_core::logging::level_for_verbosity(cli.verbose));

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    criteria::ensure_valid()?;

    match cli.command {
        Commands::Log {
            symptom,
            severity,
            at,
            meta,
            notes,
        } => cmd_log(&data_dir, symptom, severity, at, meta, notes),
        Commands::Measure {
            measurement_type,
            values,
            at,
            meta,
        } => cmd_measure(&data_dir, measurement_type, values, at, meta),
        Commands::Import { file } => cmd_import(&data_dir, &file),
        Commands::Profile { action } => cmd_profile(&data_dir, action),
        Commands::Analyze { code, window, json } => {
            cmd_analyze(&data_dir, &config, code, &window, json)
        }
        Commands::Summary { window, json } => cmd_summary(&data_dir, &config, &window, json),
        Commands::Conditions { chronic } => cmd_conditions(&data_dir, chronic),
        Commands::Export { output, window } => cmd_export(&data_dir, &config, &output, &window),
    }
}

fn parse_time(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(text) => parse_timestamp(text)
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| Error::Other(format!("Unreadable timestamp: {}", text))),
    }
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim(), value.trim()))
        .ok_or_else(|| Error::Other(format!("Expected KEY=VALUE, got {:?}", raw)))
}

fn parse_meta(raw: &str) -> Result<(String, Value)> {
    let (key, value) = split_pair(raw)?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn cmd_log(
    data_dir: &Path,
    symptom: String,
    severity: Option<f64>,
    at: Option<String>,
    meta: Vec<String>,
    notes: Option<String>,
) -> Result<()> {
    let mut log = SymptomLog::new(symptom, parse_time(at.as_deref())?);
    if let Some(severity) = severity {
        log = log.with_severity(severity);
    }
    for raw in &meta {
        let (key, value) = parse_meta(raw)?;
        log = log.with_meta(key, value);
    }
    if let Some(notes) = notes {
        log = log.with_notes(notes);
    }
    if !log.is_well_formed() {
        return Err(Error::Other(format!(
            "Severity must be between 0 and {}",
            MAX_SEVERITY
        )));
    }

    let mut store = JsonlStore::new(data_dir);
    store.append_log(&log)?;
    println!("✓ Logged {} ({})", log.symptom_id.as_deref().unwrap_or_default(), log.id);
    Ok(())
}

fn cmd_measure(
    data_dir: &Path,
    measurement_type: String,
    values: Vec<String>,
    at: Option<String>,
    meta: Vec<String>,
) -> Result<()> {
    let mut measurement = Measurement::new(measurement_type, parse_time(at.as_deref())?);
    for raw in &values {
        let (key, value) = split_pair(raw)?;
        let number: f64 = value
            .parse()
            .map_err(|_| Error::Other(format!("{} is not a number in {:?}", value, raw)))?;
        measurement = measurement.with_value(key, number);
    }
    for raw in &meta {
        let (key, value) = parse_meta(raw)?;
        measurement = measurement.with_meta(key, value);
    }
    if !measurement.is_well_formed() {
        return Err(Error::Other("Measurement values must be finite".into()));
    }

    let mut store = JsonlStore::new(data_dir);
    store.append_measurement(&measurement)?;
    println!("✓ Recorded {} ({})", measurement.measurement_type, measurement.id);
    Ok(())
}

fn cmd_import(data_dir: &Path, file: &Path) -> Result<()> {
    let mut store = JsonlStore::new(data_dir);
    let summary = store.import_json(file)?;
    println!(
        "✓ Imported {} symptom logs and {} measurements",
        summary.logs, summary.measurements
    );
    if summary.skipped > 0 {
        println!("  Skipped {} unreadable records", summary.skipped);
    }
    Ok(())
}

fn cmd_profile(data_dir: &Path, action: ProfileAction) -> Result<()> {
    let path = data_dir.join(PROFILES_FILE);
    match action {
        ProfileAction::Show { code } => {
            let book = ProfileBook::load(&path)?;
            let json = match code {
                Some(code) => serde_json::to_string_pretty(&book.get(&code))?,
                None => serde_json::to_string_pretty(&book)?,
            };
            println!("{}", json);
        }
        ProfileAction::Set {
            code,
            diagnosed,
            breathing_device,
            device_type,
        } => {
            if criteria::get(&code).is_none() {
                return Err(Error::UnknownCondition(code));
            }
            ProfileBook::update(&path, |book| {
                let profile = book.entry(&code);
                if let Some(diagnosed) = diagnosed {
                    profile.has_diagnosis = diagnosed;
                }
                if let Some(uses) = breathing_device {
                    profile.uses_breathing_device = uses;
                }
                if device_type.is_some() {
                    profile.device_type = device_type;
                }
                Ok(())
            })?;
            println!("✓ Updated profile for DC {}", code);
        }
        ProfileAction::Clear { code } => {
            let mut removed = false;
            ProfileBook::update(&path, |book| {
                removed = book.remove(&code).is_some();
                Ok(())
            })?;
            if removed {
                println!("✓ Cleared profile for DC {}", code);
            } else {
                println!("No profile stored for DC {}", code);
            }
        }
    }
    Ok(())
}

/// Records, profiles and options for one analysis run.
struct Loaded {
    logs: Vec<SymptomLog>,
    measurements: Vec<Measurement>,
    profiles: ProfileBook,
    days: u32,
    reference_time: DateTime<Utc>,
}

impl Loaded {
    fn read(data_dir: &Path, config: &Config, window: &WindowArgs) -> Result<Self> {
        let store = JsonlStore::new(data_dir);
        Ok(Self {
            logs: store.symptom_logs()?,
            measurements: store.measurements(None)?,
            profiles: ProfileBook::load(&data_dir.join(PROFILES_FILE))?,
            days: config.evaluation_days(window.days)?,
            reference_time: parse_time(window.as_of.as_deref())?,
        })
    }

    fn options(&self, config: &Config) -> AnalysisOptions<'_> {
        AnalysisOptions::new(self.days, self.reference_time)
            .with_profiles(&self.profiles)
            .with_aggregation(config.aggregation)
    }
}

fn cmd_analyze(
    data_dir: &Path,
    config: &Config,
    code: Option<String>,
    window: &WindowArgs,
    json: bool,
) -> Result<()> {
    let loaded = Loaded::read(data_dir, config, window)?;
    let options = loaded.options(config);

    if let Some(code) = code {
        let result = analyze(&code, &loaded.logs, &loaded.measurements, &options)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(analysis) = &result.analysis {
            display_analysis(analysis);
        } else {
            println!("No data for DC {} in the last {} days.", code, loaded.days);
        }
        return Ok(());
    }

    let results = analyze_all(&loaded.logs, &loaded.measurements, &options);
    let with_data: Vec<&Analysis> = results.iter().filter_map(|r| r.analysis.as_ref()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&with_data)?);
        return Ok(());
    }
    if with_data.is_empty() {
        println!("No conditions have data in the last {} days.", loaded.days);
        return Ok(());
    }
    for analysis in with_data {
        display_analysis(analysis);
    }
    Ok(())
}

fn display_analysis(analysis: &Analysis) {
    println!();
    println!(
        "DC {} {} ({})",
        analysis.diagnostic_code, analysis.condition, analysis.body_system
    );
    if analysis.governing_table.is_empty() {
        println!("  Supported rating: {}", analysis.supported_rating);
    } else {
        println!(
            "  Supported rating: {}  [{}]",
            analysis.supported_rating, analysis.governing_table
        );
    }
    for line in &analysis.rating_rationale {
        println!("  {}", line);
    }
    if !analysis.evidence.is_empty() {
        println!("  Evidence:");
        for line in &analysis.evidence {
            println!("    - {}", line);
        }
    }
    if !analysis.gaps.is_empty() {
        println!("  Gaps:");
        for line in &analysis.gaps {
            println!("    - {}", line);
        }
    }
}

fn cmd_summary(data_dir: &Path, config: &Config, window: &WindowArgs, json: bool) -> Result<()> {
    let loaded = Loaded::read(data_dir, config, window)?;
    let results = analyze_all(&loaded.logs, &loaded.measurements, &loaded.options(config));
    let summary = summarize_by_body_system(&results);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.is_empty() {
        println!("No conditions have data in the last {} days.", loaded.days);
    } else {
        for system in &summary {
            println!(
                "{:<22} {:>3}  {}",
                system.body_system,
                system.conditions_with_data,
                system.diagnostic_codes.join(", ")
            );
        }
    }
    Ok(())
}

fn cmd_conditions(data_dir: &Path, chronic: bool) -> Result<()> {
    let chronic_ids = if chronic {
        JsonlStore::new(data_dir).chronic_symptoms()?
    } else {
        Vec::new()
    };

    for condition in criteria::all() {
        if chronic
            && !condition
                .symptom_ids
                .iter()
                .any(|id| chronic_ids.iter().any(|c| c == id))
        {
            continue;
        }
        println!(
            "{:<6} {:<45} {}",
            condition.diagnostic_code, condition.name, condition.body_system
        );
    }
    Ok(())
}

fn cmd_export(data_dir: &Path, config: &Config, output: &Path, window: &WindowArgs) -> Result<()> {
    let loaded = Loaded::read(data_dir, config, window)?;
    let results = analyze_all(&loaded.logs, &loaded.measurements, &loaded.options(config));
    let rows = export_csv(output, &results)?;
    println!("✓ Exported {} conditions to {}", rows, output.display());
    Ok(())
}
