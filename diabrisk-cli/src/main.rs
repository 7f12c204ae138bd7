//! diabrisk CLI: serve the diabetes-risk model or query it from the terminal.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// diabrisk: diabetes-risk screening over a pre-trained model
#[derive(Parser, Debug)]
#[command(name = "diabrisk", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Model artifact path (overrides configuration)
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,

    /// Dataset path (overrides configuration)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Predict diabetes risk for one patient
    Predict(PredictArgs),
    /// Show the model summary, training history and dataset status
    Inspect {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct PredictArgs {
    /// Age in years (20-90)
    #[arg(long, default_value_t = 45)]
    age: i64,
    /// Gender: Male or Female
    #[arg(long, default_value = "Male")]
    gender: String,
    /// Weight in kg (30-150)
    #[arg(long, default_value_t = 70)]
    weight: i64,
    /// Height in cm (100-250)
    #[arg(long, default_value_t = 170)]
    height: i64,
    /// Smoking status: Perokok, Sudah Berhenti Merokok, Tidak Pernah Merokok (or Current, Former, Never)
    #[arg(long, default_value = "Tidak Pernah Merokok")]
    smoking: String,
    /// Physical activity in minutes per week (0-1000)
    #[arg(long, default_value_t = 150)]
    activity: i64,
    /// Family history of diabetes
    #[arg(long)]
    family_history: bool,
    /// History of hypertension
    #[arg(long)]
    hypertension: bool,
    /// Fasting glucose in mg/dL (50-400)
    #[arg(long, default_value_t = 100)]
    glucose: i64,
    /// Total cholesterol in mg/dL (100-400)
    #[arg(long, default_value_t = 180)]
    cholesterol: i64,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    fn to_form(&self) -> diabrisk_core::PatientForm {
        diabrisk_core::PatientForm {
            age: self.age,
            gender: self.gender.clone(),
            weight_kg: self.weight,
            height_cm: self.height,
            smoking_status: self.smoking.clone(),
            activity_minutes_per_week: self.activity,
            family_history_diabetes: self.family_history,
            hypertension_history: self.hypertension,
            glucose_fasting_mgdl: self.glucose,
            cholesterol_total_mgdl: self.cholesterol,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Write a default config file into the workspace
    Init,
    /// Show the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "diabrisk", "diabrisk")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "diabrisk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if let Some(hint) = commands::first_run_hint(&workspace) {
        tracing::info!("{}", hint);
    }

    let overrides = diabrisk_core::ConfigOverrides {
        artifact_path: cli.artifact,
        dataset_path: cli.dataset,
        ..Default::default()
    };

    commands::handle_command(cli.command, &workspace, overrides).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_predict_defaults_match_form() {
        let cli = Cli::try_parse_from(["diabrisk", "predict"]).unwrap();
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.to_form(), diabrisk_core::PatientForm::default());
    }

    #[test]
    fn test_predict_flags() {
        let cli = Cli::try_parse_from([
            "diabrisk",
            "predict",
            "--age",
            "61",
            "--gender",
            "Female",
            "--smoking",
            "Perokok",
            "--family-history",
            "--glucose",
            "180",
        ])
        .unwrap();
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let form = args.to_form();
        assert_eq!(form.age, 61);
        assert_eq!(form.gender, "Female");
        assert!(form.family_history_diabetes);
        assert!(!form.hypertension_history);
        assert_eq!(form.glucose_fasting_mgdl, 180);
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "diabrisk",
            "serve",
            "--port",
            "9000",
            "--artifact",
            "/tmp/m.json",
        ])
        .unwrap();
        assert_eq!(cli.artifact, Some(PathBuf::from("/tmp/m.json")));
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000), .. }));
    }
}
