use evodesign::core::models::symmetry::{SymmetryGroup, SymmetryMode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error(
        "Invalid symmetry mode '{0}'. Expected 'none', 'auto', or a group label such as 'c3' or 'd2'."
    )]
    InvalidSymmetryMode(String),

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),

    #[error("Component '{component}' cannot be empty in '{input}'.")]
    EmptyComponent {
        component: &'static str,
        input: String,
    },
}

/// Parses a symmetry mode as written in config files and on the command line.
pub fn parse_symmetry_mode(input: &str) -> Result<SymmetryMode, ParseError> {
    let trimmed = input.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "none" | "" => Ok(SymmetryMode::None),
        "auto" => Ok(SymmetryMode::Auto),
        _ => match trimmed.parse::<SymmetryGroup>() {
            Ok(SymmetryGroup::Cyclic(n)) => Ok(SymmetryMode::Cyclic(n)),
            Ok(SymmetryGroup::Dihedral(n)) => Ok(SymmetryMode::Dihedral(n)),
            Err(_) => Err(ParseError::InvalidSymmetryMode(input.to_string())),
        },
    }
}

/// Splits a `KEY=VALUE` override.
pub fn parse_assignment(input: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ParseError::InvalidAssignment(input.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "key",
            input: input.to_string(),
        });
    }
    Ok((key, value.trim()))
}
