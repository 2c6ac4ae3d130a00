use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AminoAcid {
    // --- Aliphatic, Nonpolar ---
    Alanine,    // A
    Glycine,    // G
    Isoleucine, // I
    Leucine,    // L
    Proline,    // P
    Valine,     // V

    // --- Aromatic ---
    Phenylalanine, // F
    Tryptophan,    // W
    Tyrosine,      // Y

    // --- Polar, Uncharged ---
    Asparagine, // N
    Cysteine,   // C
    Glutamine,  // Q
    Serine,     // S
    Threonine,  // T
    Methionine, // M

    // --- Positively Charged (Basic) ---
    Arginine,  // R
    Lysine,    // K
    Histidine, // H

    // --- Negatively Charged (Acidic) ---
    AsparticAcid, // D
    GlutamicAcid, // E
}

static ONE_LETTER_CODES: Map<char, AminoAcid> = phf_map! {
    'A' => AminoAcid::Alanine,
    'G' => AminoAcid::Glycine,
    'I' => AminoAcid::Isoleucine,
    'L' => AminoAcid::Leucine,
    'P' => AminoAcid::Proline,
    'V' => AminoAcid::Valine,
    'F' => AminoAcid::Phenylalanine,
    'W' => AminoAcid::Tryptophan,
    'Y' => AminoAcid::Tyrosine,
    'N' => AminoAcid::Asparagine,
    'C' => AminoAcid::Cysteine,
    'Q' => AminoAcid::Glutamine,
    'S' => AminoAcid::Serine,
    'T' => AminoAcid::Threonine,
    'M' => AminoAcid::Methionine,
    'R' => AminoAcid::Arginine,
    'K' => AminoAcid::Lysine,
    'H' => AminoAcid::Histidine,
    'D' => AminoAcid::AsparticAcid,
    'E' => AminoAcid::GlutamicAcid,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a canonical one-letter amino acid code")]
pub struct ParseAminoAcidError(pub char);

impl AminoAcid {
    pub fn from_one_letter(code: char) -> Option<Self> {
        ONE_LETTER_CODES.get(&code).copied()
    }

    pub fn to_one_letter(self) -> char {
        match self {
            AminoAcid::Alanine => 'A',
            AminoAcid::Glycine => 'G',
            AminoAcid::Isoleucine => 'I',
            AminoAcid::Leucine => 'L',
            AminoAcid::Proline => 'P',
            AminoAcid::Valine => 'V',
            AminoAcid::Phenylalanine => 'F',
            AminoAcid::Tryptophan => 'W',
            AminoAcid::Tyrosine => 'Y',
            AminoAcid::Asparagine => 'N',
            AminoAcid::Cysteine => 'C',
            AminoAcid::Glutamine => 'Q',
            AminoAcid::Serine => 'S',
            AminoAcid::Threonine => 'T',
            AminoAcid::Methionine => 'M',
            AminoAcid::Arginine => 'R',
            AminoAcid::Lysine => 'K',
            AminoAcid::Histidine => 'H',
            AminoAcid::AsparticAcid => 'D',
            AminoAcid::GlutamicAcid => 'E',
        }
    }

    pub fn to_three_letter(self) -> &'static str {
        match self {
            AminoAcid::Alanine => "ALA",
            AminoAcid::Glycine => "GLY",
            AminoAcid::Isoleucine => "ILE",
            AminoAcid::Leucine => "LEU",
            AminoAcid::Proline => "PRO",
            AminoAcid::Valine => "VAL",
            AminoAcid::Phenylalanine => "PHE",
            AminoAcid::Tryptophan => "TRP",
            AminoAcid::Tyrosine => "TYR",
            AminoAcid::Asparagine => "ASN",
            AminoAcid::Cysteine => "CYS",
            AminoAcid::Glutamine => "GLN",
            AminoAcid::Serine => "SER",
            AminoAcid::Threonine => "THR",
            AminoAcid::Methionine => "MET",
            AminoAcid::Arginine => "ARG",
            AminoAcid::Lysine => "LYS",
            AminoAcid::Histidine => "HIS",
            AminoAcid::AsparticAcid => "ASP",
            AminoAcid::GlutamicAcid => "GLU",
        }
    }
}

impl TryFrom<char> for AminoAcid {
    type Error = ParseAminoAcidError;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        Self::from_one_letter(code).ok_or(ParseAminoAcidError(code))
    }
}

impl FromStr for AminoAcid {
    type Err = ParseAminoAcidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            (Some(c), Some(_)) => Err(ParseAminoAcidError(c)),
            (None, _) => Err(ParseAminoAcidError('\0')),
        }
    }
}

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_one_letter())
    }
}
