use super::{BandSymbol, CompileError, parse};
use crate::flight_control::CameraKind;

/// Pre-flight check for user formulas. Parses and resolves symbols, never
/// generates a calculator call.
pub struct FormulaValidator;

impl FormulaValidator {
    /// Returns `true` if `text` parses and every identifier names a band of `camera`.
    pub fn is_valid(text: &str, camera: CameraKind) -> bool { Self::check(text, camera).is_ok() }

    /// Same as [`FormulaValidator::is_valid`], reporting the first problem found.
    ///
    /// # Errors
    /// [`CompileError::Syntax`] or [`CompileError::UnknownSymbol`].
    pub fn check(text: &str, camera: CameraKind) -> Result<(), CompileError> {
        let expr = parse(text)?;
        match expr.identifiers().into_iter().find(|ident| {
            ident.parse::<BandSymbol>().ok().and_then(|s| camera.band_index(s)).is_none()
        }) {
            Some(unknown) => Err(CompileError::UnknownSymbol(unknown.to_string())),
            None => Ok(()),
        }
    }
}
