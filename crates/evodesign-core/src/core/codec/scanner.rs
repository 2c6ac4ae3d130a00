use crate::core::models::contig::{ChainHeader, ConstraintString, ConstraintToken};
use crate::core::models::mask::{MutabilityMask, SymbolClass};

/// Chain letters and the reference coordinate range used to frame an encoded body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainFrame {
    pub reference_chain: char,
    pub design_chain: char,
    pub reference_start: usize,
    pub reference_end: usize,
}

impl ChainFrame {
    /// Frames a reference chain of `length` residues as chain `A`, designed body as chain `B`.
    pub fn for_reference(length: usize) -> Self {
        Self {
            reference_chain: 'A',
            design_chain: 'B',
            reference_start: 1,
            reference_end: length,
        }
    }

    fn header(&self) -> ChainHeader {
        ChainHeader {
            chain: self.reference_chain,
            start: self.reference_start,
            end: self.reference_end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Between,
    Retained { start: usize, end: usize },
    Free { length: usize },
}

/// Finite-state scanner emitting one token per class transition.
struct RunScanner {
    chain: char,
    state: RunState,
    tokens: Vec<ConstraintToken>,
}

impl RunScanner {
    fn new(chain: char) -> Self {
        Self {
            chain,
            state: RunState::Between,
            tokens: Vec::new(),
        }
    }

    /// `position` is the 1-based absolute coordinate of the symbol.
    fn feed(&mut self, position: usize, class: SymbolClass) {
        self.state = match (self.state, class) {
            (RunState::Retained { start, .. }, SymbolClass::Retained) => RunState::Retained {
                start,
                end: position,
            },
            (RunState::Free { length }, SymbolClass::Free) => RunState::Free { length: length + 1 },
            (current, class) => {
                self.emit(current);
                match class {
                    SymbolClass::Retained => RunState::Retained {
                        start: position,
                        end: position,
                    },
                    SymbolClass::Free => RunState::Free { length: 1 },
                    SymbolClass::Deletion => RunState::Between,
                }
            }
        };
    }

    fn emit(&mut self, state: RunState) {
        match state {
            RunState::Between => {}
            RunState::Retained { start, end } => self.tokens.push(ConstraintToken::FixedSpan {
                chain: self.chain,
                start,
                end,
            }),
            RunState::Free { length } => self.tokens.push(ConstraintToken::FreeRun { length }),
        }
    }

    fn finish(mut self) -> Vec<ConstraintToken> {
        let last = self.state;
        self.emit(last);
        self.tokens
    }
}

/// Encodes a mask into a single-copy constraint string.
///
/// Retained runs become fixed spans in absolute mask coordinates, free runs (`X` and `*`
/// alike) become free-run lengths, and deletion markers close the current run without
/// emitting anything.
pub fn encode(mask: &MutabilityMask, frame: &ChainFrame) -> ConstraintString {
    let mut scanner = RunScanner::new(frame.design_chain);
    for (i, symbol) in mask.symbols().iter().enumerate() {
        scanner.feed(i + 1, symbol.class());
    }
    ConstraintString::new(frame.header(), scanner.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::mask::MaskSymbol;

    fn encode_str(mask: &str) -> ConstraintString {
        let mask: MutabilityMask = mask.parse().unwrap();
        encode(&mask, &ChainFrame::for_reference(mask.len()))
    }

    /// Independent run-length scan used as the oracle for token counts.
    fn manual_runs(mask: &str) -> Vec<(bool, usize)> {
        let mut runs: Vec<(bool, usize)> = Vec::new();
        for c in mask.chars() {
            let is_free = c == 'X' || c == '*';
            match runs.last_mut() {
                Some((free, len)) if *free == is_free => *len += 1,
                _ => runs.push((is_free, 1)),
            }
        }
        runs
    }

    #[test]
    fn scenario_mixed_mask_with_deletions() {
        let contig = encode_str("LAG--XXC");
        assert_eq!(contig.to_string(), "A1-8/0 B1-3/2/B8-8");
        let lengths: Vec<_> = contig.body().iter().map(ConstraintToken::len).collect();
        assert_eq!(lengths, vec![3, 2, 1]);
    }

    #[test]
    fn all_retained_mask_emits_single_fixed_span() {
        let contig = encode_str("MKTAYIAK");
        assert_eq!(
            contig.body(),
            &[ConstraintToken::FixedSpan {
                chain: 'B',
                start: 1,
                end: 8
            }]
        );
    }

    #[test]
    fn all_free_mask_emits_single_free_run() {
        let contig = encode_str("XXXXX");
        assert_eq!(contig.body(), &[ConstraintToken::FreeRun { length: 5 }]);
    }

    #[test]
    fn free_and_masked_markers_share_one_run() {
        let contig = encode_str("AX*XA");
        assert_eq!(contig.to_string(), "A1-5/0 B1-1/3/B5-5");
    }

    #[test]
    fn empty_mask_yields_header_only() {
        let contig = encode_str("");
        assert_eq!(contig.body_tokens().count(), 0);
        assert_eq!(contig.to_string(), "A1-0/0");

        let reparsed: ConstraintString = contig.to_string().parse().unwrap();
        assert_eq!(reparsed, contig);
    }

    #[test]
    fn all_deletion_mask_yields_header_only() {
        let contig = encode_str("-----");
        assert_eq!(contig.body_tokens().count(), 0);
        assert_eq!(contig.to_string(), "A1-5/0");
    }

    #[test]
    fn deletion_between_retained_runs_splits_spans() {
        let contig = encode_str("AA-CC");
        assert_eq!(contig.to_string(), "A1-5/0 B1-2/B4-5");
    }

    #[test]
    fn token_runs_match_manual_scan_for_deletion_free_masks() {
        for mask in ["", "A", "X", "AXAXA", "XXAAXX", "LAGXXC", "*A*A**", "MKTXXXXXXLLE"] {
            let contig = encode_str(mask);
            let from_tokens: Vec<_> = contig
                .body()
                .iter()
                .map(|t| (t.is_free(), t.len()))
                .collect();
            assert_eq!(from_tokens, manual_runs(mask), "{mask}");

            let reparsed: ConstraintString = contig.to_string().parse().unwrap();
            assert_eq!(reparsed.body(), contig.body(), "{mask}");
        }
    }

    #[test]
    fn token_lengths_sum_to_non_deletion_count() {
        for mask in ["", "A", "AX-", "--XX--AA", "LAG--XXC", "X-X-X", "MKT*-*LLE"] {
            let parsed: MutabilityMask = mask.parse().unwrap();
            let contig = encode(&parsed, &ChainFrame::for_reference(parsed.len()));
            let non_deleted = parsed
                .symbols()
                .iter()
                .filter(|s| !matches!(s, MaskSymbol::Deleted))
                .count();
            assert_eq!(contig.body_residue_count(), non_deleted, "{mask}");
            if !parsed.has_deletions() {
                assert_eq!(contig.body_residue_count(), parsed.len(), "{mask}");
            }
        }
    }

    #[test]
    fn custom_frame_sets_header_and_chain_letters() {
        let mask: MutabilityMask = "AXA".parse().unwrap();
        let frame = ChainFrame {
            reference_chain: 'H',
            design_chain: 'L',
            reference_start: 10,
            reference_end: 42,
        };
        assert_eq!(encode(&mask, &frame).to_string(), "H10-42/0 L1-1/1/L3-3");
    }
}
