//! CLI subcommand handlers.

use crate::{Commands, ConfigAction, PredictArgs};
use diabrisk_core::{AppContext, ConfigOverrides, DiabriskConfig, PredictionOutcome};
use diabrisk_ml::ArtifactSummary;
use std::path::Path;

fn load(workspace: &Path, overrides: &ConfigOverrides) -> anyhow::Result<DiabriskConfig> {
    diabrisk_core::load_config(Some(workspace), Some(overrides))
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
}

/// Hint shown while the workspace has no configuration file yet.
pub fn first_run_hint(workspace: &Path) -> Option<String> {
    if diabrisk_core::config_exists(Some(workspace)) {
        return None;
    }
    Some(format!(
        "No configuration file found, using defaults. Run `diabrisk config init` to create {}.",
        workspace.join(".diabrisk").join("config.toml").display()
    ))
}

/// Handle a CLI subcommand.
pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    mut overrides: ConfigOverrides,
) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => {
            overrides.host = host;
            overrides.port = port;
            handle_serve(workspace, &overrides).await
        }
        Commands::Predict(args) => handle_predict(&args, workspace, &overrides),
        Commands::Inspect { json } => handle_inspect(json, workspace, &overrides),
        Commands::Config { action } => handle_config(action, workspace, &overrides),
    }
}

async fn handle_serve(workspace: &Path, overrides: &ConfigOverrides) -> anyhow::Result<()> {
    let config = load(workspace, overrides)?;
    let ctx = AppContext::initialize(config).shared();

    for warning in [ctx.artifact().warning(), ctx.dataset().warning()]
        .into_iter()
        .flatten()
    {
        eprintln!("Warning: {warning}");
    }

    let addr = format!("{}:{}", ctx.config().server.host, ctx.config().server.port);
    tracing::info!(
        %addr,
        artifact = ?ctx.artifact().status(),
        dataset = ?ctx.dataset().status(),
        "Starting diabrisk gateway"
    );
    println!("diabrisk gateway listening on http://{addr}");
    diabrisk_core::gateway::run(ctx).await?;
    tracing::info!("Gateway stopped");
    Ok(())
}

fn handle_predict(
    args: &PredictArgs,
    workspace: &Path,
    overrides: &ConfigOverrides,
) -> anyhow::Result<()> {
    let config = load(workspace, overrides)?;
    let ctx = AppContext::initialize(config);
    let outcome = ctx.predict(&args.to_form())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_outcome(&outcome));
    }
    Ok(())
}

fn render_outcome(outcome: &PredictionOutcome) -> String {
    format!(
        "Model:       {}\nBMI:         {:.2}\nResult:      {}\nConfidence:  {:.2}%\n\n{}\n{}\n",
        outcome.model_name,
        outcome.bmi,
        outcome.verdict.headline,
        outcome.confidence_percent,
        outcome.verdict.message,
        outcome.verdict.advice,
    )
}

fn handle_inspect(json: bool, workspace: &Path, overrides: &ConfigOverrides) -> anyhow::Result<()> {
    let config = load(workspace, overrides)?;
    let ctx = AppContext::initialize(config);
    let summary = ctx.artifact().artifact().map(|a| a.summary());

    if json {
        let body = serde_json::json!({
            "artifact": {
                "status": ctx.artifact().status(),
                "warning": ctx.artifact().warning(),
                "summary": summary,
            },
            "dataset": {
                "status": ctx.dataset().status(),
                "warning": ctx.dataset().warning(),
                "rows": ctx.dataset().dataset().map(|d| d.row_count()),
                "columns": ctx.dataset().dataset().map(|d| d.column_count()),
                "target_counts": ctx.dataset().dataset().map(|d| d.target_counts()),
            },
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match &summary {
        Some(summary) => print!("{}", render_summary(summary)),
        None => println!(
            "Model:    {}",
            ctx.artifact().warning().unwrap_or_default()
        ),
    }

    println!();
    match ctx.dataset().dataset() {
        Some(dataset) => {
            let counts = dataset.target_counts();
            println!(
                "Dataset:  {} rows x {} columns ({})",
                dataset.row_count(),
                dataset.column_count(),
                dataset.info().location
            );
            println!(
                "Target:   {} without diabetes, {} with diabetes",
                counts.negative, counts.positive
            );
        }
        None => println!(
            "Dataset:  {}",
            ctx.dataset().warning().unwrap_or_default()
        ),
    }
    Ok(())
}

fn render_summary(summary: &ArtifactSummary) -> String {
    let mut out = format!(
        "Model:    {} ({}, {})\nAccuracy: {:.2}%\nFeatures: {}\nGender:   {}\nSmoking:  {}\n",
        summary.model_name,
        summary.algorithm,
        summary.estimator,
        summary.accuracy * 100.0,
        summary.feature_names.join(", "),
        summary.gender_classes.join(", "),
        summary.smoking_classes.join(", "),
    );

    if !summary.training_history.is_empty() {
        out.push_str("\nTraining history:\n");
        out.push_str(&format!(
            "  {:<28} {:>9} {:>9} {:>9}\n",
            "Model", "Baseline", "Tuned", "Delta"
        ));
        for record in &summary.training_history {
            out.push_str(&format!(
                "  {:<28} {:>8.2}% {:>8.2}% {:>+8.2}%\n",
                record.model,
                record.baseline_accuracy * 100.0,
                record.tuned_accuracy * 100.0,
                record.improvement() * 100.0,
            ));
        }
    }
    out
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    overrides: &ConfigOverrides,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".diabrisk");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let toml_str = toml::to_string_pretty(&DiabriskConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load(workspace, overrides)?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}
