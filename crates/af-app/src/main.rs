use std::fs;
use std::process::ExitCode;

use af_app::batch::{default_out_dir, run_batch};
use af_app::cli::Cli;
use af_app::pipeline::{emit, render};
use af_core::error::{CoreError, ErrorResponse};
use anyhow::{Context, Result};
use clap::Parser;

fn main() -> ExitCode {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(cli: &Cli) -> Result<()> {
    cli.validate_source()?;
    let config = cli.resolve_config()?;

    // Export par lots
    if let Some(folder) = cli.batch.as_deref() {
        let out_dir = cli.batch_out.clone().unwrap_or_else(|| default_out_dir(folder));
        let report = run_batch(folder, &out_dir, &config)?;
        eprintln!(
            "{} fichier(s) écrit(s) dans {}, {} échec(s)",
            report.written.len(),
            out_dir.display(),
            report.failed.len()
        );
        return Ok(());
    }

    let output = render(cli.render_input()?, &config)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, output.as_bytes())
                .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
            log::info!("écrit : {}", path.display());
        }
        None => {
            emit(&mut std::io::stdout().lock(), &output).context("Écriture sur la sortie standard")?;
        }
    }
    Ok(())
}

/// Erreur JSON sur stderr ; code 2 pour une erreur d'entrée, 1 sinon.
fn report(err: &anyhow::Error) -> ExitCode {
    let response = err
        .chain()
        .find_map(|e| e.downcast_ref::<CoreError>())
        .map_or_else(|| ErrorResponse::internal(format!("{err:#}")), ErrorResponse::from);
    log::error!("{err:#}");
    eprintln!("{}", response.to_json());
    if response.status() == 400 {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
