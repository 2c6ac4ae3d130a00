use super::cycle::{self, CycleInput, CycleOutcome};
use crate::core::models::mask::MutabilityMask;
use crate::engine::context::DesignContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy)]
pub struct EvolutionInput<'a> {
    pub initial_sequence: &'a str,
    pub mask: &'a MutabilityMask,
    pub reference_structure: Option<&'a Path>,
    pub reference_length: usize,
    pub cycles: usize,
}

/// Runs `cycles` design cycles back to back, each starting from the previous cycle's sequence.
///
/// The first failing cycle ends the run; nothing is retried.
#[instrument(skip_all, name = "evolution_workflow", fields(cycles = input.cycles))]
pub fn run(input: &EvolutionInput, ctx: &DesignContext) -> Result<Vec<CycleOutcome>, EngineError> {
    let mut outcomes: Vec<CycleOutcome> = Vec::with_capacity(input.cycles);
    let mut sequence = input.initial_sequence.to_string();

    for cycle in 0..input.cycles {
        ctx.reporter.report(Progress::StatusUpdate {
            text: format!("Design cycle {}/{}", cycle + 1, input.cycles),
        });
        let outcome = cycle::run(
            &CycleInput {
                cycle,
                sequence: &sequence,
                mask: input.mask,
                reference_structure: input.reference_structure,
                reference_length: input.reference_length,
            },
            ctx,
        )?;
        sequence = outcome.sequence.clone();
        outcomes.push(outcome);
    }

    info!(
        "Evolution complete after {} cycle(s). Final sequence: {}",
        outcomes.len(),
        sequence
    );
    Ok(outcomes)
}
