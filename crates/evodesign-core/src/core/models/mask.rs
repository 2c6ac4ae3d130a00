use super::residue::AminoAcid;
use crate::core::codec::CodecError;
use std::fmt;
use std::str::FromStr;

/// Marks a position whose residue is regenerated from scratch.
pub const FREE_MARKER: char = 'X';
/// Alternative free marker; scanned into the same class as [`FREE_MARKER`].
pub const MASKED_MARKER: char = '*';
/// Marks a position removed from the design. Also used as the placeholder in output sequences.
pub const DELETION_MARKER: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskSymbol {
    Retained(AminoAcid),
    Free,
    Deleted,
}

/// Scanner classes. Deletions are their own class: they close a run and emit nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolClass {
    Retained,
    Free,
    Deletion,
}

impl MaskSymbol {
    pub fn parse(symbol: char, position: usize) -> Result<Self, CodecError> {
        match symbol {
            FREE_MARKER | MASKED_MARKER => Ok(MaskSymbol::Free),
            DELETION_MARKER => Ok(MaskSymbol::Deleted),
            c => AminoAcid::from_one_letter(c)
                .map(MaskSymbol::Retained)
                .ok_or(CodecError::EncodingInvariantViolation { position, symbol }),
        }
    }

    pub fn class(&self) -> SymbolClass {
        match self {
            MaskSymbol::Retained(_) => SymbolClass::Retained,
            MaskSymbol::Free => SymbolClass::Free,
            MaskSymbol::Deleted => SymbolClass::Deletion,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, MaskSymbol::Deleted)
    }
}

/// A per-residue mutability mask. Position order is significant and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutabilityMask {
    raw: String,
    symbols: Vec<MaskSymbol>,
}

impl MutabilityMask {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn symbols(&self) -> &[MaskSymbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of residues the generator is expected to produce for this mask.
    pub fn expected_residue_count(&self) -> usize {
        self.symbols.iter().filter(|s| !s.is_deleted()).count()
    }

    pub fn has_free_positions(&self) -> bool {
        self.symbols.iter().any(|s| matches!(s, MaskSymbol::Free))
    }

    pub fn has_deletions(&self) -> bool {
        self.symbols.iter().any(MaskSymbol::is_deleted)
    }

    /// Zero-based indices of every deletion marker.
    pub fn deletion_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_deleted())
            .map(|(i, _)| i)
    }
}

impl FromStr for MutabilityMask {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols = s
            .chars()
            .enumerate()
            .map(|(i, c)| MaskSymbol::parse(c, i + 1))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: s.to_string(),
            symbols,
        })
    }
}

impl fmt::Display for MutabilityMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
