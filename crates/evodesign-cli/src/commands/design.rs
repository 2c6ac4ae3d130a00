use crate::cli::DesignArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::report::CsvReportSink;
use crate::ui::CliProgressHandler;
use evodesign::core::symmetry::detection::{AnanasDetector, NoDetector, SymmetryDetector};
use evodesign::engine::cancel::CancellationToken;
use evodesign::engine::context::DesignContext;
use evodesign::engine::process::CommandLauncher;
use evodesign::engine::progress::{Progress, ProgressReporter};
use evodesign::engine::redesign::CommandRedesign;
use evodesign::engine::sink::{ArtifactSink, NullSink};
use evodesign::workflows::cycle::CycleOutcome;
use evodesign::workflows::evolve::{self, EvolutionInput};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn run(args: DesignArgs, ui_sender: mpsc::Sender<Progress>) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app_config = build_config(&args)?;

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; stopping after the current poll.");
                cancel.cancel();
            }
        })
    };

    println!(
        "Starting {} design cycle(s) into {}...",
        app_config.cycles,
        app_config.core_config.output_root.display()
    );
    let progress_handler = CliProgressHandler::new(ui_sender);
    let outcomes = tokio::task::spawn_blocking(move || {
        run_evolution(&app_config, &progress_handler, &cancel)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Design task panicked: {}", e)))?;
    interrupt.abort();

    let outcomes = outcomes?;
    print_summary(&outcomes);
    Ok(())
}

fn run_evolution(
    app_config: &AppConfig,
    progress_handler: &CliProgressHandler,
    cancel: &CancellationToken,
) -> Result<Vec<CycleOutcome>> {
    let config = &app_config.core_config;
    let launcher = CommandLauncher::new(config.generator.clone());
    let redesign = CommandRedesign::new(config.redesign.clone());
    let detector: Box<dyn SymmetryDetector> = match &app_config.detector_program {
        Some(program) => Box::new(AnanasDetector::new(program.clone())),
        None => Box::new(NoDetector),
    };
    let sink: Box<dyn ArtifactSink> = match &app_config.report_path {
        Some(path) => Box::new(CsvReportSink::create(path)?),
        None => Box::new(NullSink),
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let ctx = DesignContext::new(
        config,
        &launcher,
        &redesign,
        detector.as_ref(),
        sink.as_ref(),
        &reporter,
        cancel,
    );
    let input = EvolutionInput {
        initial_sequence: &app_config.sequence,
        mask: &app_config.mask,
        reference_structure: app_config.reference_structure.as_deref(),
        reference_length: app_config.reference_length,
        cycles: app_config.cycles,
    };

    info!("Invoking the evolution workflow...");
    Ok(evolve::run(&input, &ctx)?)
}

fn print_summary(outcomes: &[CycleOutcome]) {
    for outcome in outcomes {
        match &outcome.selected {
            Some(candidate) => println!(
                "✓ Cycle {} (score {:.4}): {}",
                outcome.cycle, candidate.score, outcome.sequence
            ),
            None => println!("✓ Cycle {} (unchanged): {}", outcome.cycle, outcome.sequence),
        }
    }
    if let Some(last) = outcomes.last() {
        println!("Final sequence: {}", last.sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(sequence: &str, mask: &str) -> DesignArgs {
        DesignArgs {
            sequence: sequence.to_string(),
            mask: mask.to_string(),
            input: None,
            config: None,
            output_dir: None,
            report: None,
            cycles: None,
            reference_length: None,
            symmetry: None,
            num_designs: None,
            diffusion_steps: None,
            set_values: vec![],
        }
    }

    #[tokio::test]
    async fn mismatched_sequence_fails_before_any_work() {
        let (sender, _receiver) = mpsc::channel(8);
        let result = run(args("MKT", "MKTX"), sender).await;
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[tokio::test]
    async fn fixed_mask_completes_without_external_programs() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("cycles.csv");
        let mut design_args = args("MKTAYI", "MKTA-I");
        design_args.output_dir = Some(dir.path().join("out"));
        design_args.report = Some(report.clone());
        design_args.cycles = Some(2);

        let (sender, _receiver) = mpsc::channel(64);
        run(design_args, sender).await.unwrap();

        let content = std::fs::read_to_string(report).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("MKTA-I"));
    }
}
