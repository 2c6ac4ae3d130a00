use super::error::EngineError;
use crate::core::io::report::parse_score;
use crate::core::models::candidate::{CandidateSequence, RawCandidate};
use tracing::{debug, warn};

/// Attaches parsed scores to candidates, dropping (with a warning) those without a valid score.
pub fn score_candidates(raw: Vec<RawCandidate>) -> Vec<CandidateSequence> {
    raw.into_iter()
        .filter_map(|candidate| match parse_score(&candidate.header) {
            Some(score) => Some(CandidateSequence {
                sequence: candidate.sequence,
                score,
                source: candidate.source,
            }),
            None => {
                warn!(
                    source = ?candidate.source,
                    "Skipping candidate with unparsable score: '{}'", candidate.header
                );
                None
            }
        })
        .collect()
}

/// Highest score wins; ties go to the candidate seen first.
pub fn select_best(candidates: &[CandidateSequence]) -> Option<&CandidateSequence> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(current) if current.score >= candidate.score => Some(current),
        _ => Some(candidate),
    })
}

/// Scores `raw` and returns the best candidate.
pub fn select(raw: Vec<RawCandidate>) -> Result<CandidateSequence, EngineError> {
    let examined = raw.len();
    let scored = score_candidates(raw);
    let best = select_best(&scored)
        .cloned()
        .ok_or(EngineError::NoCandidate { examined })?;
    debug!(
        score = best.score,
        source = ?best.source,
        "Selected best of {} scored candidates.", scored.len()
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn raw(header: &str, sequence: &str) -> RawCandidate {
        RawCandidate {
            header: header.to_string(),
            sequence: sequence.to_string(),
            source: PathBuf::from("seqs/design.fa"),
        }
    }

    #[test]
    fn highest_score_is_selected() {
        let best = select(vec![
            raw("T=0.1, sample=1, score=0.9", "AAA"),
            raw("T=0.1, sample=2, score=1.4", "CCC"),
            raw("T=0.1, sample=3, score=1.1", "DDD"),
        ])
        .unwrap();
        assert_eq!(best.sequence, "CCC");
        assert_eq!(best.score, 1.4);
    }

    #[test]
    fn ties_keep_the_first_candidate() {
        let best = select(vec![
            raw("score=2.0", "FIRST"),
            raw("score=2.0", "SECOND"),
        ])
        .unwrap();
        assert_eq!(best.sequence, "FIRST");
    }

    #[test]
    fn unparsable_scores_are_excluded() {
        let scored = score_candidates(vec![
            raw("sample=1, score=n/a", "AAA"),
            raw("sample=2", "CCC"),
            raw("sample=3, score=-0.5", "DDD"),
        ]);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].sequence, "DDD");
    }

    #[test]
    fn no_parsable_candidate_is_an_error() {
        let err = select(vec![raw("sample=1", "AAA")]).unwrap_err();
        assert!(matches!(err, EngineError::NoCandidate { examined: 1 }));
        assert!(matches!(
            select(vec![]),
            Err(EngineError::NoCandidate { examined: 0 })
        ));
    }

    #[test]
    fn negative_scores_compare_numerically() {
        let candidates = score_candidates(vec![
            raw("score=-3.5", "AAA"),
            raw("score=-1e-1", "CCC"),
        ]);
        assert_eq!(select_best(&candidates).unwrap().sequence, "CCC");
    }
}
