use super::CodecError;
use crate::core::models::mask::{DELETION_MARKER, MaskSymbol, MutabilityMask};
use tracing::debug;

/// Merges a generated sequence back into the full mask length.
///
/// The generated sequence must contain exactly one residue per non-deletion position. Deletion
/// positions receive [`DELETION_MARKER`]; every other position consumes the next generated
/// residue in order. No alignment is attempted.
pub fn reinsert_deletions(generated: &str, mask: &MutabilityMask) -> Result<String, CodecError> {
    let expected = mask.expected_residue_count();
    let actual = generated.chars().count();
    if actual != expected {
        return Err(CodecError::LengthMismatch { expected, actual });
    }

    let mut residues = generated.chars();
    let mut merged = String::with_capacity(mask.len());
    for symbol in mask.symbols() {
        match symbol {
            MaskSymbol::Deleted => merged.push(DELETION_MARKER),
            _ => match residues.next() {
                Some(residue) => merged.push(residue),
                None => return Err(CodecError::LengthMismatch { expected, actual }),
            },
        }
    }
    Ok(merged)
}

/// Forces the deletion placeholder at every deletion position of a full-length sequence.
pub fn enforce_deletions(sequence: &str, mask: &MutabilityMask) -> Result<String, CodecError> {
    let actual = sequence.chars().count();
    if actual != mask.len() {
        return Err(CodecError::LengthMismatch {
            expected: mask.len(),
            actual,
        });
    }

    Ok(sequence
        .chars()
        .zip(mask.symbols())
        .enumerate()
        .map(|(i, (residue, symbol))| {
            if symbol.is_deleted() && residue != DELETION_MARKER {
                debug!(position = i + 1, residue = %residue, "Deleting residue.");
                DELETION_MARKER
            } else {
                residue
            }
        })
        .collect())
}

/// Reinsertion followed by the deletion post-pass.
pub fn restore_sequence(generated: &str, mask: &MutabilityMask) -> Result<String, CodecError> {
    let merged = reinsert_deletions(generated, mask)?;
    enforce_deletions(&merged, mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(s: &str) -> MutabilityMask {
        s.parse().unwrap()
    }

    #[test]
    fn reinserts_placeholders_at_deletion_positions() {
        let merged = reinsert_deletions("LAGWYC", &mask("LAG--XXC")).unwrap();
        assert_eq!(merged, "LAG--WYC");
    }

    #[test]
    fn length_mismatch_is_reported_without_partial_merge() {
        let m = mask("AX-XA-");
        assert_eq!(m.expected_residue_count(), 4);
        let err = reinsert_deletions("AAA", &m).unwrap_err();
        assert_eq!(
            err,
            CodecError::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn five_residue_mask_rejects_four_residue_candidate() {
        let err = reinsert_deletions("MKTA", &mask("MK-XXA")).unwrap_err();
        assert_eq!(
            err,
            CodecError::LengthMismatch {
                expected: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn deletion_free_reinsertion_is_idempotent() {
        let m = mask("AXXA*");
        let once = reinsert_deletions("AWYAK", &m).unwrap();
        let twice = reinsert_deletions(&once, &m).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn enforce_deletions_overwrites_and_is_idempotent() {
        let m = mask("AX-A");
        let once = enforce_deletions("AWKA", &m).unwrap();
        assert_eq!(once, "AW-A");
        assert_eq!(enforce_deletions(&once, &m).unwrap(), once);
    }

    #[test]
    fn enforce_deletions_requires_full_length() {
        assert!(matches!(
            enforce_deletions("AW", &mask("AX-A")),
            Err(CodecError::LengthMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn restore_sequence_is_stable_under_repeated_post_pass() {
        let m = mask("--LXX-A");
        let restored = restore_sequence("LWYA", &m).unwrap();
        assert_eq!(restored, "--LWY-A");
        assert_eq!(enforce_deletions(&restored, &m).unwrap(), restored);
    }

    #[test]
    fn empty_mask_accepts_empty_sequence() {
        assert_eq!(restore_sequence("", &mask("")).unwrap(), "");
    }
}
