use crate::core::codec::reinsert::{enforce_deletions, restore_sequence};
use crate::core::codec::scanner::{ChainFrame, encode};
use crate::core::models::candidate::CandidateSequence;
use crate::core::models::contig::ConstraintString;
use crate::core::models::mask::MutabilityMask;
use crate::core::symmetry::frame::symmetrize_reference;
use crate::core::symmetry::planner::{self, SymmetryPlan};
use crate::engine::context::DesignContext;
use crate::engine::error::EngineError;
use crate::engine::process::{GenerationRequest, effective_steps};
use crate::engine::progress::Progress;
use crate::engine::selector;
use crate::engine::supervisor::{GenerationJob, SampleOutput, prepare_staging};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Separator between chains in a multi-chain redesigned sequence.
const CHAIN_SEPARATOR: char = '/';

/// Inputs of one design cycle.
#[derive(Debug, Clone, Copy)]
pub struct CycleInput<'a> {
    pub cycle: usize,
    pub sequence: &'a str,
    pub mask: &'a MutabilityMask,
    pub reference_structure: Option<&'a Path>,
    /// Length of the fixed reference chain that prefixes every constraint string.
    pub reference_length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub cycle: usize,
    /// Full-length sequence with deletion placeholders.
    pub sequence: String,
    pub mask: String,
    pub constraint: ConstraintString,
    pub copies: usize,
    pub selected: Option<CandidateSequence>,
    pub samples: Vec<SampleOutput>,
}

pub fn job_name(cycle: usize) -> String {
    format!("design_cycle_{cycle}")
}

#[instrument(skip_all, name = "design_cycle", fields(cycle = input.cycle))]
pub fn run(input: &CycleInput, ctx: &DesignContext) -> Result<CycleOutcome, EngineError> {
    let config = ctx.config;
    let mask = input.mask;

    // === Phase 1: Encoding ===
    ctx.reporter.report(Progress::PhaseStart { name: "Encoding" });
    let frame = ChainFrame::for_reference(input.reference_length);
    let constraint = encode(mask, &frame);
    info!(constraint = %constraint, "Encoded mutability mask.");
    ctx.reporter.report(Progress::PhaseFinish);

    if !mask.has_free_positions() {
        info!("Mask has no free positions; keeping the input sequence.");
        ctx.reporter.report(Progress::Message(format!(
            "Cycle {}: no free positions, sequence kept.",
            input.cycle
        )));
        let sequence = enforce_deletions(input.sequence, mask)?;
        ctx.sink
            .sequence_selected(input.cycle, &sequence, &constraint, None);
        return Ok(CycleOutcome {
            cycle: input.cycle,
            sequence,
            mask: mask.as_str().to_string(),
            constraint,
            copies: 1,
            selected: None,
            samples: Vec::new(),
        });
    }

    std::fs::create_dir_all(&config.output_root)
        .map_err(|e| EngineError::io(&config.output_root, e))?;

    // === Phase 2: Symmetry planning ===
    let plan = planner::plan(
        config.symmetry,
        input.reference_structure,
        &config.output_root,
        ctx.detector,
    )?;
    let constraint = plan.apply(&constraint);
    if plan.copies > 1 {
        info!(copies = plan.copies, constraint = %constraint, "Replicated constraint for symmetry.");
    }

    // === Phase 3: Structure generation ===
    ctx.reporter.report(Progress::PhaseStart { name: "Generation" });
    let name = job_name(input.cycle);
    let input_structure =
        generator_input(input.reference_structure, &plan, &config.output_root, &name)?;
    let staging_dir = prepare_staging(&config.supervisor.staging_root, &name)?;
    let request = GenerationRequest {
        output_prefix: config.output_root.join(&name),
        name,
        steps: effective_steps(constraint.mode(), config.generator.diffusion_steps),
        contig: constraint.clone(),
        input_structure,
        staging_dir,
        symmetry: plan.group,
        samples: config.generator.num_designs,
    };
    let mut job = GenerationJob::start(ctx.launcher, request, &config.supervisor)?;
    let outcome = job.supervise(ctx.reporter, ctx.sink, ctx.cancel)?;
    ctx.reporter.report(Progress::PhaseFinish);

    // === Phase 4: Sequence redesign ===
    ctx.reporter.report(Progress::PhaseStart { name: "Redesign" });
    ctx.reporter.report(Progress::TaskStart {
        total_steps: outcome.samples.len() as u64,
    });
    let mut candidates = Vec::new();
    for sample in &outcome.samples {
        if ctx.cancel.is_cancelled() {
            return Err(EngineError::Cancelled {
                sample: sample.sample,
                last_completed_step: None,
            });
        }
        candidates.extend(ctx.redesign.redesign(&sample.design, &config.output_root)?);
        ctx.reporter.report(Progress::TaskIncrement);
    }
    ctx.reporter.report(Progress::TaskFinish);
    ctx.reporter.report(Progress::PhaseFinish);

    // === Phase 5: Selection and reinsertion ===
    let selected = selector::select(candidates)?;
    let sequence = restore_sequence(first_chain(&selected.sequence), mask)?;
    info!(
        score = selected.score,
        sequence = %sequence,
        "Cycle complete."
    );
    ctx.reporter.report(Progress::Message(format!(
        "Cycle {}: selected {} (score {:.3}).",
        input.cycle, sequence, selected.score
    )));
    ctx.sink
        .sequence_selected(input.cycle, &sequence, &constraint, Some(&selected));

    Ok(CycleOutcome {
        cycle: input.cycle,
        sequence,
        mask: mask.as_str().to_string(),
        constraint,
        copies: plan.copies,
        selected: Some(selected),
        samples: outcome.samples,
    })
}

/// Structure handed to the generator. A detected assembly is reduced to its asymmetric unit in
/// the symmetry frame and written next to the outputs as `<job>_input.pdb`.
fn generator_input(
    reference: Option<&Path>,
    plan: &SymmetryPlan,
    output_root: &Path,
    name: &str,
) -> Result<Option<PathBuf>, EngineError> {
    let Some(reference) = reference else {
        return Ok(None);
    };
    let (Some(report), Some(group)) = (&plan.report, plan.group) else {
        return Ok(Some(reference.to_path_buf()));
    };

    let content = std::fs::read_to_string(reference).map_err(|e| EngineError::io(reference, e))?;
    let Some(unit) = symmetrize_reference(&content, report, group) else {
        warn!(
            group = %report.group,
            "Detected symmetry has no usable axes; passing the reference unchanged."
        );
        return Ok(Some(reference.to_path_buf()));
    };

    let path = output_root.join(format!("{name}_input.pdb"));
    std::fs::write(&path, unit).map_err(|e| EngineError::io(&path, e))?;
    info!(path = ?path, chains = ?report.chains, "Wrote asymmetric unit for generation.");
    Ok(Some(path))
}

/// Symmetric copies share one layout, so the first designed chain stands for all of them.
fn first_chain(sequence: &str) -> &str {
    sequence
        .split(CHAIN_SEPARATOR)
        .next()
        .unwrap_or(sequence)
        .trim()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::codec::CodecError;
    use crate::core::models::candidate::RawCandidate;
    use crate::core::models::symmetry::SymmetryMode;
    use crate::core::symmetry::detection::{
        AxisTransform, DetectionError, NoDetector, SymmetryDetector, SymmetryReport,
    };
    use crate::engine::cancel::CancellationToken;
    use crate::engine::config::DesignConfig;
    use crate::engine::config::tests::complete_builder;
    use crate::engine::progress::ProgressReporter;
    use crate::engine::redesign::RedesignStep;
    use crate::engine::sink::NullSink;
    use crate::engine::supervisor::tests::FakeLauncher;
    use nalgebra::{Point3, Unit, Vector3};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    pub(crate) struct FakeRedesign {
        pub candidates: Vec<(&'static str, &'static str)>,
        pub structures: Mutex<Vec<PathBuf>>,
    }

    impl FakeRedesign {
        pub(crate) fn new(candidates: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                candidates,
                structures: Mutex::new(Vec::new()),
            }
        }
    }

    impl RedesignStep for FakeRedesign {
        fn redesign(
            &self,
            structure: &Path,
            _output_dir: &Path,
        ) -> Result<Vec<RawCandidate>, EngineError> {
            assert!(structure.exists(), "{structure:?} should have been generated");
            self.structures.lock().unwrap().push(structure.to_path_buf());
            Ok(self
                .candidates
                .iter()
                .map(|(header, sequence)| RawCandidate {
                    header: header.to_string(),
                    sequence: sequence.to_string(),
                    source: structure.with_extension("fa"),
                })
                .collect())
        }
    }

    pub(crate) fn test_config(root: &Path, symmetry: SymmetryMode) -> DesignConfig {
        complete_builder()
            .output_root(root.join("outputs"))
            .staging_root(root.join("staging"))
            .diffusion_steps(5)
            .poll_interval(Duration::from_millis(1))
            .max_poll_interval(Duration::from_millis(4))
            .symmetry(symmetry)
            .build()
            .unwrap()
    }

    fn run_cycle(
        config: &DesignConfig,
        launcher: &FakeLauncher,
        redesign: &FakeRedesign,
        sequence: &str,
        mask: &str,
    ) -> Result<CycleOutcome, EngineError> {
        let mask: MutabilityMask = mask.parse().unwrap();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        let ctx = DesignContext::new(
            config,
            launcher,
            redesign,
            &NoDetector,
            &NullSink,
            &reporter,
            &cancel,
        );
        run(
            &CycleInput {
                cycle: 0,
                sequence,
                mask: &mask,
                reference_structure: None,
                reference_length: mask.len(),
            },
            &ctx,
        )
    }

    #[test]
    fn cycle_selects_best_candidate_and_restores_deletions() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), SymmetryMode::None);
        let launcher = FakeLauncher::healthy();
        let redesign = FakeRedesign::new(vec![
            ("T=0.1, sample=1, score=1.0", "MKWYA"),
            ("T=0.1, sample=2, score=2.0", "MKAAA"),
        ]);

        let outcome = run_cycle(&config, &launcher, &redesign, "MKTQRA", "MK-XXA").unwrap();

        assert_eq!(outcome.sequence, "MK-AAA");
        assert_eq!(outcome.copies, 1);
        assert_eq!(outcome.constraint.to_string(), "A1-6/0 B1-2/2/B6-6");
        assert_eq!(outcome.selected.unwrap().score, 2.0);
        assert_eq!(outcome.samples.len(), 2);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(redesign.structures.lock().unwrap().len(), 2);
    }

    #[test]
    fn mask_without_free_positions_skips_generation() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), SymmetryMode::None);
        let launcher = FakeLauncher::healthy();
        let redesign = FakeRedesign::new(vec![]);

        let outcome = run_cycle(&config, &launcher, &redesign, "MKQTA", "MK-TA").unwrap();

        assert_eq!(outcome.sequence, "MK-TA");
        assert!(outcome.selected.is_none());
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn candidate_of_wrong_length_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), SymmetryMode::None);
        let launcher = FakeLauncher::healthy();
        let redesign = FakeRedesign::new(vec![("score=1.0", "MKA")]);

        let err = run_cycle(&config, &launcher, &redesign, "MKTQRA", "MK-XXA").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Codec {
                source: CodecError::LengthMismatch {
                    expected: 5,
                    actual: 3
                }
            }
        ));
    }

    #[test]
    fn symmetric_cycle_replicates_constraint_and_uses_first_chain() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), SymmetryMode::Cyclic(2));
        let launcher = FakeLauncher::healthy();
        let redesign = FakeRedesign::new(vec![("score=0.5", "MKAA/MKAA")]);

        let outcome = run_cycle(&config, &launcher, &redesign, "MKTT", "MKXX").unwrap();

        assert_eq!(outcome.copies, 2);
        assert_eq!(outcome.constraint.copies(), 2);
        assert_eq!(outcome.sequence, "MKAA");
    }

    #[test]
    fn unscored_candidates_yield_no_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), SymmetryMode::None);
        let launcher = FakeLauncher::healthy();
        let redesign = FakeRedesign::new(vec![("sample=1", "MKAAA")]);

        let err = run_cycle(&config, &launcher, &redesign, "MKTQRA", "MK-XXA").unwrap_err();
        assert!(matches!(err, EngineError::NoCandidate { examined: 2 }));
    }

    #[test]
    fn first_chain_splits_multichain_sequences() {
        assert_eq!(first_chain("ABC/DEF"), "ABC");
        assert_eq!(first_chain("ABC"), "ABC");
    }

    struct AxisDetector {
        transforms: Vec<AxisTransform>,
    }

    impl SymmetryDetector for AxisDetector {
        fn detect(&self, _: &Path, _: &Path) -> Result<SymmetryReport, DetectionError> {
            Ok(SymmetryReport {
                group: "c2".to_string(),
                chains: vec!["A".to_string()],
                transforms: self.transforms.clone(),
                rmsd: 0.2,
            })
        }
    }

    const DIMER: &str = "\
ATOM      1  CA  GLY A   1       2.000   2.000   3.000  1.00  0.00           C
ATOM      2  CA  GLY A   2       1.000   2.000   4.000  1.00  0.00           C
ATOM      3  CA  GLY B   1       0.000   2.000   3.000  1.00  0.00           C
ATOM      4  CA  GLY B   2       1.000   2.000   2.000  1.00  0.00           C
END
";

    fn run_detected_cycle(
        dir: &Path,
        detector: &AxisDetector,
        launcher: &FakeLauncher,
        events: &Mutex<Vec<Progress>>,
    ) -> CycleOutcome {
        let config = test_config(dir, SymmetryMode::Auto);
        let reference = dir.join("dimer.pdb");
        std::fs::write(&reference, DIMER).unwrap();
        let redesign = FakeRedesign::new(vec![("score=1.5", "MKAA/MKAA")]);
        let reporter =
            ProgressReporter::with_callback(Box::new(move |p| events.lock().unwrap().push(p)));
        let cancel = CancellationToken::new();
        let mask: MutabilityMask = "MKXX".parse().unwrap();
        let ctx = DesignContext::new(
            &config, launcher, &redesign, detector, &NullSink, &reporter, &cancel,
        );
        run(
            &CycleInput {
                cycle: 3,
                sequence: "MKTT",
                mask: &mask,
                reference_structure: Some(&reference),
                reference_length: 4,
            },
            &ctx,
        )
        .unwrap()
    }

    #[test]
    fn detected_assembly_is_reduced_to_its_asymmetric_unit() {
        let dir = tempfile::tempdir().unwrap();
        let detector = AxisDetector {
            transforms: vec![AxisTransform {
                center: Point3::new(1.0, 2.0, 3.0),
                axis: Unit::new_normalize(Vector3::new(0.0, 1.0, 0.0)),
            }],
        };
        let launcher = FakeLauncher::healthy();
        let events = Mutex::new(Vec::new());

        let outcome = run_detected_cycle(dir.path(), &detector, &launcher, &events);
        assert_eq!(outcome.copies, 2);

        let expected = dir.path().join("outputs").join("design_cycle_3_input.pdb");
        assert_eq!(*launcher.inputs.lock().unwrap(), vec![Some(expected.clone())]);

        let unit = std::fs::read_to_string(&expected).unwrap();
        let atoms: Vec<&str> = unit.lines().filter(|l| l.starts_with("ATOM")).collect();
        assert_eq!(atoms.len(), 2);
        assert!(atoms.iter().all(|l| l.as_bytes()[21] == b'A'));
        // The y axis through the center becomes the z axis through the origin.
        let coords: Vec<f64> = atoms[0][30..54]
            .split_whitespace()
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(coords, vec![1.0, 0.0, 0.0]);
        assert!(unit.lines().any(|l| l == "END"));
    }

    #[test]
    fn detection_without_axes_keeps_the_reference() {
        let dir = tempfile::tempdir().unwrap();
        let detector = AxisDetector { transforms: vec![] };
        let launcher = FakeLauncher::healthy();
        let events = Mutex::new(Vec::new());

        run_detected_cycle(dir.path(), &detector, &launcher, &events);

        assert_eq!(
            *launcher.inputs.lock().unwrap(),
            vec![Some(dir.path().join("dimer.pdb"))]
        );
        assert!(!dir.path().join("outputs/design_cycle_3_input.pdb").exists());
    }

    #[test]
    fn completed_cycle_announces_the_selected_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let detector = AxisDetector { transforms: vec![] };
        let launcher = FakeLauncher::healthy();
        let events = Mutex::new(Vec::new());

        run_detected_cycle(dir.path(), &detector, &launcher, &events);

        let messages: Vec<String> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Progress::Message(text) => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec!["Cycle 3: selected MKAA (score 1.500).".to_string()]);
    }
}
