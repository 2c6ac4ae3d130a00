use std::path::PathBuf;

/// A header/sequence record emitted by the redesign step, before its score is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    pub header: String,
    pub sequence: String,
    pub source: PathBuf,
}

/// A redesigned sequence with a parsed score. Higher scores win selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSequence {
    pub sequence: String,
    pub score: f64,
    pub source: PathBuf,
}
