use crate::core::models::contig::ConstraintString;
use nalgebra::Point3;

const CHAIN_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

const CHAIN_COLUMN: usize = 21;
const RESSEQ_COLUMNS: std::ops::Range<usize> = 22..26;
const ICODE_COLUMN: usize = 26;
const COORD_COLUMNS: std::ops::Range<usize> = 30..54;

fn is_coordinate_record(line: &str) -> bool {
    line.starts_with("ATOM") || line.starts_with("HETATM")
}

/// Chain letter and 1-based residue number for the `index`-th residue of a structure.
fn locate(index: usize, chain_lengths: &[usize]) -> (u8, usize) {
    let mut offset = 0;
    for (chain_idx, &len) in chain_lengths.iter().enumerate() {
        if index < offset + len {
            return (chain_letter(chain_idx), index - offset + 1);
        }
        offset += len;
    }
    // Residues past the layout stay on the last chain.
    let last = chain_lengths.len().saturating_sub(1);
    let last_offset = offset - chain_lengths.last().copied().unwrap_or(0);
    (chain_letter(last), index - last_offset + 1)
}

fn chain_letter(chain_idx: usize) -> u8 {
    CHAIN_LETTERS[chain_idx.min(CHAIN_LETTERS.len() - 1)]
}

/// Rewrites chain identifiers and residue numbers of coordinate records so that consecutive
/// residues fill the chains of `chain_lengths` in order, each chain numbered from 1.
///
/// Multi-model files restart the residue count at every `MODEL` record. Lines too short to carry
/// a residue identifier are copied unchanged.
pub fn apply_chain_layout(pdb: &str, chain_lengths: &[usize]) -> String {
    let mut output = String::with_capacity(pdb.len());
    let mut residue_index: Option<usize> = None;
    let mut last_key: Option<String> = None;

    for line in pdb.lines() {
        if line.starts_with("MODEL") {
            residue_index = None;
            last_key = None;
        }

        if !is_coordinate_record(line) || !line.is_ascii() || line.len() <= ICODE_COLUMN {
            output.push_str(line);
            output.push('\n');
            continue;
        }

        let key = &line[CHAIN_COLUMN..=ICODE_COLUMN];
        if last_key.as_deref() != Some(key) {
            residue_index = Some(residue_index.map_or(0, |i| i + 1));
            last_key = Some(key.to_string());
        }
        let (chain, number) = locate(residue_index.unwrap_or(0), chain_lengths);

        output.push_str(&line[..CHAIN_COLUMN]);
        output.push(chain as char);
        output.push_str(&format!("{:>4}", number % 10_000));
        output.push_str(&line[RESSEQ_COLUMNS.end..]);
        output.push('\n');
    }
    output
}

/// Applies the chain layout described by a (possibly replicated) constraint string.
pub fn apply_constraint_layout(pdb: &str, contig: &ConstraintString) -> String {
    apply_chain_layout(pdb, &contig.chain_lengths())
}

fn read_coordinates(line: &str) -> Option<Point3<f64>> {
    let field = |i: usize| -> Option<f64> {
        let start = COORD_COLUMNS.start + 8 * i;
        line.get(start..start + 8)?.trim().parse().ok()
    };
    Some(Point3::new(field(0)?, field(1)?, field(2)?))
}

/// Keeps the coordinate records of `chains` and moves each atom through `transform`.
///
/// Records of other chains are dropped. Records whose coordinates cannot be read are kept
/// unchanged, as are all non-coordinate lines.
pub fn map_asymmetric_unit<F>(pdb: &str, chains: &[String], transform: F) -> String
where
    F: Fn(Point3<f64>) -> Point3<f64>,
{
    let mut output = String::with_capacity(pdb.len());
    for line in pdb.lines() {
        if !is_coordinate_record(line) || !line.is_ascii() || line.len() <= CHAIN_COLUMN {
            output.push_str(line);
            output.push('\n');
            continue;
        }
        let chain = &line[CHAIN_COLUMN..=CHAIN_COLUMN];
        if !chains.iter().any(|c| c == chain) {
            continue;
        }
        match read_coordinates(line) {
            Some(point) => {
                let moved = transform(point);
                output.push_str(&line[..COORD_COLUMNS.start]);
                output.push_str(&format!("{:8.3}{:8.3}{:8.3}", moved.x, moved.y, moved.z));
                output.push_str(&line[COORD_COLUMNS.end..]);
            }
            None => output.push_str(line),
        }
        output.push('\n');
    }
    output
}
