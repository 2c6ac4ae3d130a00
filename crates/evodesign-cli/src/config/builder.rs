use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::DesignArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use evodesign::core::models::mask::MutabilityMask;
use evodesign::engine::config as core_config;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Merges CLI flags over `-S` overrides over the config file over built-in defaults.
pub fn build_config(args: &DesignArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let mask: MutabilityMask = args.mask.parse()?;
    let sequence_len = args.sequence.chars().count();
    if sequence_len != mask.len() {
        return Err(CliError::Argument(format!(
            "Sequence has {} residues but the mask has {} positions.",
            sequence_len,
            mask.len()
        )));
    }

    let generator = file_config.generator.take().unwrap_or_default();
    let supervisor = file_config.supervisor.take().unwrap_or_default();
    let symmetry = file_config.symmetry.take().unwrap_or_default();
    let redesign = file_config.redesign.take().unwrap_or_default();

    let symmetry_mode = parser::parse_symmetry_mode(
        args.symmetry
            .as_deref()
            .or(symmetry.mode.as_deref())
            .unwrap_or(defaults.symmetry),
    )
    .map_err(|e| CliError::Argument(e.to_string()))?;

    let poll_interval_ms = supervisor
        .poll_interval_ms
        .unwrap_or(defaults.poll_interval_ms);
    let max_poll_interval_ms = supervisor
        .max_poll_interval_ms
        .unwrap_or(defaults.max_poll_interval_ms.max(poll_interval_ms));

    let core_config = core_config::DesignConfigBuilder::new()
        .output_root(
            args.output_dir
                .clone()
                .or(file_config.output_dir.take())
                .unwrap_or_else(|| PathBuf::from(defaults.output_dir)),
        )
        .symmetry(symmetry_mode)
        .generator_program(
            generator
                .program
                .unwrap_or_else(|| PathBuf::from(defaults.generator_program)),
        )
        .generator_args(generator.args.unwrap_or_default())
        .generator_environment(generator.env.unwrap_or_default().into_iter().collect())
        .diffusion_steps(
            args.diffusion_steps
                .or(generator.diffusion_steps)
                .unwrap_or(defaults.diffusion_steps),
        )
        .num_designs(
            args.num_designs
                .or(generator.num_designs)
                .unwrap_or(defaults.num_designs),
        )
        .guiding_potentials(generator.guiding_potentials.unwrap_or(false))
        .hotspots(generator.hotspots)
        .checkpoint_override(generator.checkpoint)
        .staging_root(
            supervisor
                .staging_root
                .unwrap_or_else(|| PathBuf::from(defaults.staging_root)),
        )
        .poll_interval(Duration::from_millis(poll_interval_ms))
        .max_poll_interval(Duration::from_millis(max_poll_interval_ms))
        .terminator(
            supervisor
                .terminator
                .unwrap_or_else(|| defaults.terminator.to_string()),
        )
        .redesign_program(
            redesign
                .program
                .unwrap_or_else(|| PathBuf::from(defaults.redesign_program)),
        )
        .redesign_args(redesign.args.unwrap_or_default())
        .redesign_chains(
            redesign
                .chains
                .unwrap_or_else(|| defaults.redesign_chains.to_string()),
        )
        .num_sequences(redesign.num_sequences.unwrap_or(defaults.num_sequences))
        .sampling_temperature(
            redesign
                .sampling_temperature
                .unwrap_or(defaults.sampling_temperature),
        )
        .seed(redesign.seed.unwrap_or(defaults.seed))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let reference_length = args
        .reference_length
        .or(file_config.reference_length)
        .unwrap_or(mask.len());
    let cycles = args
        .cycles
        .or(file_config.cycles)
        .unwrap_or(defaults.cycles);
    debug!(cycles, reference_length, "Resolved design configuration.");

    Ok(AppConfig {
        sequence: args.sequence.clone(),
        mask,
        reference_structure: args.input.clone(),
        reference_length,
        cycles,
        report_path: args.report.clone(),
        detector_program: symmetry.detector,
        core_config,
    })
}

fn invalid_value(key: &str, kind: &str, value: &str) -> CliError {
    CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let (key, value_str) =
            parser::parse_assignment(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        let int = || -> Result<usize> {
            value_str
                .parse()
                .map_err(|_| invalid_value(key, "integer", value_str))
        };
        let millis = || -> Result<u64> {
            value_str
                .parse()
                .map_err(|_| invalid_value(key, "integer", value_str))
        };

        match key {
            "cycles" => config.cycles = Some(int()?),
            "reference-length" => config.reference_length = Some(int()?),
            "generator.diffusion-steps" => {
                config
                    .generator
                    .get_or_insert_with(Default::default)
                    .diffusion_steps = Some(int()?);
            }
            "generator.num-designs" => {
                config
                    .generator
                    .get_or_insert_with(Default::default)
                    .num_designs = Some(int()?);
            }
            "generator.hotspots" => {
                config
                    .generator
                    .get_or_insert_with(Default::default)
                    .hotspots = Some(value_str.to_string());
            }
            "generator.guiding-potentials" => {
                config
                    .generator
                    .get_or_insert_with(Default::default)
                    .guiding_potentials = Some(
                    value_str
                        .parse()
                        .map_err(|_| invalid_value(key, "boolean", value_str))?,
                );
            }
            "supervisor.poll-interval-ms" => {
                config
                    .supervisor
                    .get_or_insert_with(Default::default)
                    .poll_interval_ms = Some(millis()?);
            }
            "supervisor.max-poll-interval-ms" => {
                config
                    .supervisor
                    .get_or_insert_with(Default::default)
                    .max_poll_interval_ms = Some(millis()?);
            }
            "symmetry.mode" => {
                config.symmetry.get_or_insert_with(Default::default).mode =
                    Some(value_str.to_string());
            }
            "redesign.num-sequences" => {
                config
                    .redesign
                    .get_or_insert_with(Default::default)
                    .num_sequences = Some(int()?);
            }
            "redesign.sampling-temperature" => {
                config
                    .redesign
                    .get_or_insert_with(Default::default)
                    .sampling_temperature = Some(
                    value_str
                        .parse()
                        .map_err(|_| invalid_value(key, "float", value_str))?,
                );
            }
            "redesign.seed" => {
                config.redesign.get_or_insert_with(Default::default).seed = Some(millis()?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
