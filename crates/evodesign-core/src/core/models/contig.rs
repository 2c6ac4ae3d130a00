use crate::core::codec::CodecError;
use std::fmt;
use std::str::FromStr;

/// Separator between tokens inside one segment.
pub const TOKEN_SEPARATOR: char = '/';
/// Token that terminates the header and breaks the chain.
pub const CHAIN_BREAK: &str = "0";

/// One run of the constraint grammar. Coordinates are 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintToken {
    FixedSpan { chain: char, start: usize, end: usize },
    FreeRun { length: usize },
}

impl ConstraintToken {
    pub fn len(&self) -> usize {
        match *self {
            ConstraintToken::FixedSpan { start, end, .. } => end + 1 - start,
            ConstraintToken::FreeRun { length } => length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, ConstraintToken::FixedSpan { .. })
    }

    pub fn is_free(&self) -> bool {
        matches!(self, ConstraintToken::FreeRun { .. })
    }
}

impl fmt::Display for ConstraintToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintToken::FixedSpan { chain, start, end } => write!(f, "{chain}{start}-{end}"),
            ConstraintToken::FreeRun { length } => write!(f, "{length}"),
        }
    }
}

impl FromStr for ConstraintToken {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CodecError::InvalidGrammar(format!("malformed token '{s}'"));
        let first = s.chars().next().ok_or_else(invalid)?;

        if first.is_ascii_alphabetic() {
            let (start, end) = s[1..].split_once('-').ok_or_else(invalid)?;
            let start: usize = start.parse().map_err(|_| invalid())?;
            let end: usize = end.parse().map_err(|_| invalid())?;
            if start == 0 || end < start {
                return Err(invalid());
            }
            Ok(ConstraintToken::FixedSpan {
                chain: first,
                start,
                end,
            })
        } else {
            let length: usize = s.parse().map_err(|_| invalid())?;
            if length == 0 {
                return Err(CodecError::InvalidGrammar(
                    "chain break is only allowed after the header span".to_string(),
                ));
            }
            Ok(ConstraintToken::FreeRun { length })
        }
    }
}

/// The fixed reference chain declared ahead of the designed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainHeader {
    pub chain: char,
    pub start: usize,
    pub end: usize,
}

impl ChainHeader {
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unlike a body span, the header may be empty (`A1-0`) when there is no reference chain.
impl FromStr for ChainHeader {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid =
            || CodecError::InvalidGrammar(format!("header '{s}' must be a fixed span"));
        let mut chars = s.chars();
        let chain = chars
            .next()
            .filter(char::is_ascii_alphabetic)
            .ok_or_else(invalid)?;
        let (start, end) = chars.as_str().split_once('-').ok_or_else(invalid)?;
        let start: usize = start.parse().map_err(|_| invalid())?;
        let end: usize = end.parse().map_err(|_| invalid())?;
        if start == 0 || end + 1 < start {
            return Err(invalid());
        }
        Ok(ChainHeader { chain, start, end })
    }
}

impl fmt::Display for ChainHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}-{}{}{}",
            self.chain, self.start, self.end, TOKEN_SEPARATOR, CHAIN_BREAK
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContigMode {
    /// No free runs: the generator only partially noises the input structure.
    Partial,
    /// Free runs scaffold fixed motif spans.
    Fixed,
    /// Only free runs.
    Free,
}

/// A header plus one body segment per symmetric copy.
///
/// The display form is `A1-120/0 B1-3/2/B8-8`, with one space-separated segment per copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintString {
    header: ChainHeader,
    segments: Vec<Vec<ConstraintToken>>,
}

impl ConstraintString {
    pub fn new(header: ChainHeader, body: Vec<ConstraintToken>) -> Self {
        Self {
            header,
            segments: vec![body],
        }
    }

    pub fn header(&self) -> &ChainHeader {
        &self.header
    }

    pub fn segments(&self) -> &[Vec<ConstraintToken>] {
        &self.segments
    }

    /// The single-copy body.
    pub fn body(&self) -> &[ConstraintToken] {
        self.segments.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn copies(&self) -> usize {
        self.segments.len()
    }

    /// Every body token across all copies, header excluded.
    pub fn body_tokens(&self) -> impl Iterator<Item = &ConstraintToken> {
        self.segments.iter().flatten()
    }

    /// Residues described by one copy of the body.
    pub fn body_residue_count(&self) -> usize {
        self.body().iter().map(ConstraintToken::len).sum()
    }

    /// Repeats the single-copy body `copies` times. The header is never replicated.
    pub fn replicate(&self, copies: usize) -> Self {
        let copies = copies.max(1);
        Self {
            header: self.header,
            segments: vec![self.body().to_vec(); copies],
        }
    }

    pub fn mode(&self) -> ContigMode {
        let has_free = self.body_tokens().any(ConstraintToken::is_free);
        let has_fixed = self.body_tokens().any(ConstraintToken::is_fixed);
        match (has_free, has_fixed) {
            (false, _) => ContigMode::Partial,
            (true, true) => ContigMode::Fixed,
            (true, false) => ContigMode::Free,
        }
    }

    /// Residue count of every chain in output order: the header chain, then one per copy.
    pub fn chain_lengths(&self) -> Vec<usize> {
        std::iter::once(self.header.len())
            .chain(
                self.segments
                    .iter()
                    .map(|segment| segment.iter().map(ConstraintToken::len).sum()),
            )
            .collect()
    }
}

impl fmt::Display for ConstraintString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        for segment in self.segments.iter().filter(|s| !s.is_empty()) {
            f.write_str(" ")?;
            for (i, token) in segment.iter().enumerate() {
                if i > 0 {
                    write!(f, "{TOKEN_SEPARATOR}")?;
                }
                write!(f, "{token}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for ConstraintString {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut groups = s.split_whitespace();
        let header_group = groups
            .next()
            .ok_or_else(|| CodecError::InvalidGrammar("empty constraint string".to_string()))?;

        let header_span = header_group
            .strip_suffix(CHAIN_BREAK)
            .and_then(|rest| rest.strip_suffix(TOKEN_SEPARATOR))
            .ok_or_else(|| {
                CodecError::InvalidGrammar(format!(
                    "header '{header_group}' must end with a chain break"
                ))
            })?;
        let header: ChainHeader = header_span.parse()?;

        let mut segments = groups
            .map(|group| {
                group
                    .split(TOKEN_SEPARATOR)
                    .map(str::parse)
                    .collect::<Result<Vec<ConstraintToken>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        if segments.is_empty() {
            segments.push(Vec::new());
        }

        Ok(Self { header, segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(end: usize) -> ChainHeader {
        ChainHeader {
            chain: 'A',
            start: 1,
            end,
        }
    }

    fn fixed(start: usize, end: usize) -> ConstraintToken {
        ConstraintToken::FixedSpan {
            chain: 'B',
            start,
            end,
        }
    }

    #[test]
    fn display_joins_tokens_without_trailing_separator() {
        let contig = ConstraintString::new(
            header(8),
            vec![fixed(1, 3), ConstraintToken::FreeRun { length: 2 }, fixed(8, 8)],
        );
        assert_eq!(contig.to_string(), "A1-8/0 B1-3/2/B8-8");
    }

    #[test]
    fn header_only_string_has_no_body() {
        let contig = ConstraintString::new(header(0), vec![]);
        assert_eq!(contig.to_string(), "A1-0/0");
        assert_eq!(contig.body_tokens().count(), 0);
        assert_eq!(contig.copies(), 1);

        let reparsed: ConstraintString = "A1-0/0".parse().unwrap();
        assert_eq!(reparsed, contig);
        assert!(reparsed.header().is_empty());
    }

    #[test]
    fn header_may_be_empty_but_not_inverted() {
        assert!("A1-0/0 4".parse::<ConstraintString>().is_ok());
        assert!("A3-1/0 4".parse::<ConstraintString>().is_err());
        assert!("A0-0/0".parse::<ConstraintString>().is_err());
    }

    #[test]
    fn parse_recovers_header_and_segments() {
        let contig: ConstraintString = "A1-120/0 B1-3/2/B8-8 B1-3/2/B8-8".parse().unwrap();
        assert_eq!(*contig.header(), header(120));
        assert_eq!(contig.copies(), 2);
        assert_eq!(contig.body().len(), 3);
        assert_eq!(contig.body_residue_count(), 6);
    }

    #[test]
    fn parse_and_display_are_inverse() {
        let text = "A5-60/0 12/B3-9/4";
        let contig: ConstraintString = text.parse().unwrap();
        assert_eq!(contig.to_string(), text);
    }

    #[test]
    fn parse_rejects_missing_chain_break() {
        assert!(matches!(
            "A1-10 B1-3".parse::<ConstraintString>(),
            Err(CodecError::InvalidGrammar(_))
        ));
    }

    #[test]
    fn parse_rejects_malformed_tokens() {
        for bad in ["A1-10/0 B3", "A1-10/0 B5-2", "A1-10/0 0", "A1-10/0 B1-2//3", "5/0"] {
            assert!(bad.parse::<ConstraintString>().is_err(), "{bad}");
        }
    }

    #[test]
    fn replicate_repeats_body_but_not_header() {
        let contig = ConstraintString::new(
            header(10),
            vec![fixed(1, 2), ConstraintToken::FreeRun { length: 3 }],
        );
        let tripled = contig.replicate(3);
        assert_eq!(tripled.copies(), 3);
        assert_eq!(tripled.body_tokens().count(), 3 * contig.body_tokens().count());
        assert_eq!(tripled.header(), contig.header());
        assert_eq!(tripled.to_string(), "A1-10/0 B1-2/3 B1-2/3 B1-2/3");
        assert_eq!(tripled.chain_lengths(), vec![10, 5, 5, 5]);
    }

    #[test]
    fn mode_is_derived_from_body_tokens() {
        let partial = ConstraintString::new(header(4), vec![fixed(1, 4)]);
        let fixed_mode =
            ConstraintString::new(header(4), vec![fixed(1, 2), ConstraintToken::FreeRun { length: 2 }]);
        let free = ConstraintString::new(header(4), vec![ConstraintToken::FreeRun { length: 4 }]);
        assert_eq!(partial.mode(), ContigMode::Partial);
        assert_eq!(fixed_mode.mode(), ContigMode::Fixed);
        assert_eq!(free.mode(), ContigMode::Free);
    }
}
