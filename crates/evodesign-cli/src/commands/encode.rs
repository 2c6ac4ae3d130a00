use crate::cli::EncodeArgs;
use crate::error::{CliError, Result};
use crate::utils::parser::parse_symmetry_mode;
use evodesign::core::codec::scanner::{ChainFrame, encode};
use evodesign::core::models::contig::ConstraintString;
use evodesign::core::models::mask::MutabilityMask;
use evodesign::core::models::symmetry::SymmetryMode;
use evodesign::core::symmetry::detection::NoDetector;
use evodesign::core::symmetry::planner;
use evodesign::engine::error::EngineError;
use tracing::info;

pub async fn run(args: EncodeArgs) -> Result<()> {
    let constraint = encode_mask(&args)?;
    info!(mode = ?constraint.mode(), "Encoded mask into constraint string.");
    println!("{}", constraint);
    Ok(())
}

fn encode_mask(args: &EncodeArgs) -> Result<ConstraintString> {
    let mask: MutabilityMask = args.mask.parse()?;
    let reference_length = args.reference_length.unwrap_or(mask.len());
    let constraint = encode(&mask, &ChainFrame::for_reference(reference_length));

    let mode = match args.symmetry.as_deref() {
        Some(label) => parse_symmetry_mode(label).map_err(|e| CliError::Argument(e.to_string()))?,
        None => SymmetryMode::None,
    };
    if mode == SymmetryMode::Auto {
        return Err(CliError::Argument(
            "Automatic symmetry detection needs a structure; pass an explicit group to 'encode'."
                .to_string(),
        ));
    }

    let plan = planner::plan(mode, None, &std::env::temp_dir(), &NoDetector)
        .map_err(EngineError::from)?;
    Ok(plan.apply(&constraint))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(mask: &str, reference_length: Option<usize>, symmetry: Option<&str>) -> EncodeArgs {
        EncodeArgs {
            mask: mask.to_string(),
            reference_length,
            symmetry: symmetry.map(str::to_string),
        }
    }

    #[test]
    fn mixed_mask_encodes_header_and_body() {
        let constraint = encode_mask(&args("MKXX-I", None, None)).unwrap();
        assert_eq!(constraint.to_string(), "A1-6/0 B1-2/2/B6-6");
    }

    #[test]
    fn explicit_group_replicates_the_body() {
        let constraint = encode_mask(&args("MKXX", Some(4), Some("c2"))).unwrap();
        assert_eq!(constraint.copies(), 2);
        assert_eq!(constraint.to_string(), "A1-4/0 B1-2/2 B1-2/2");
    }

    #[test]
    fn auto_symmetry_is_rejected() {
        assert!(matches!(
            encode_mask(&args("MKXX", None, Some("auto"))),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn bad_mask_symbol_is_reported() {
        assert!(matches!(
            encode_mask(&args("MK#X", None, None)),
            Err(CliError::Codec(_))
        ));
    }
}
