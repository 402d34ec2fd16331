//! Band-math formula handling: parsing user expressions over spectral band
//! names, validating them against a camera kind and compiling them into
//! `gdal_calc.py` invocations.

mod ast;
mod band_symbol;
mod compiler;
mod error;
mod lexer;
mod parser;
mod validator;

use regex::Regex;
use std::sync::LazyLock;

pub use ast::{BinaryOp, Expr};
pub use band_symbol::BandSymbol;
pub use compiler::{BandBinding, CalculatorInvocation, CommandCompiler, PRIMARY_ORTHOPHOTO, is_builtin};
pub use error::{CompileError, SyntaxError, SyntaxReason};
pub use parser::parse;
pub use validator::FormulaValidator;

static INDEX_NAME_REJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]").unwrap());

/// Reduces a user supplied index name to `[a-z0-9_-]`.
///
/// The result is used verbatim in file paths, calculator arguments and
/// map-server identifiers, so this must run before the name reaches any of
/// them. Returns `None` if nothing usable remains.
pub fn sanitize_index_name(raw: &str) -> Option<String> {
    let cleaned = INDEX_NAME_REJECT.replace_all(&raw.to_lowercase(), "").into_owned();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// Names of files and folders the system writes next to user artifacts:
/// flight products in the orthophoto folder and the project's main mosaic.
const RESERVED_NAMES: [&str; 8] = [
    "odm_orthophoto",
    "odm_orthophoto_annotated",
    "rgb",
    "dsm",
    "dsm_colored_hillshade",
    "colorbar",
    "ortho",
    "mainortho",
];

/// `true` if a sanitized artifact name would collide with a system product.
pub fn is_reserved_name(name: &str) -> bool { RESERVED_NAMES.contains(&name) }

/// `true` if `name` already consists of `[a-z0-9_-]` only and is not empty.
pub fn is_sanitized_index_name(name: &str) -> bool {
    !name.is_empty() && !INDEX_NAME_REJECT.is_match(name)
}

#[cfg(test)]
mod tests;
