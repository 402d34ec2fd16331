use super::{
    BandSymbol, CompileError, Expr, ast::format_literal, is_reserved_name, is_sanitized_index_name,
    parse,
};
use crate::collaborators::ToolInvocation;
use crate::flight_control::CameraKind;
use crate::util::IndexScaling;
use itertools::Itertools;
use std::{collections::HashMap, fmt, sync::LazyLock};

/// Raster every index is computed from, relative to the flight's orthophoto folder.
pub const PRIMARY_ORTHOPHOTO: &str = "odm_orthophoto.tif";
const CALCULATOR_PROGRAM: &str = "gdal_calc.py";
const OUTPUT_TYPE: &str = "Byte";
const TILED_CREATION_OPTION: &str = "TILED=YES";

/// One `-X file --X_band=n` input of a calculator call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandBinding {
    pub letter: char,
    pub file: String,
    pub band: u8,
}

/// A fully resolved `gdal_calc.py` call. It is never run here; see
/// [`crate::collaborators::RasterCalculator`].
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorInvocation {
    inputs: Vec<BandBinding>,
    calc: String,
    outfile: String,
    nodata: i32,
}

impl CalculatorInvocation {
    pub fn inputs(&self) -> &[BandBinding] { &self.inputs }
    pub fn calc(&self) -> &str { &self.calc }
    pub fn outfile(&self) -> &str { &self.outfile }
    pub fn nodata(&self) -> i32 { self.nodata }

    /// Argument vector for direct process execution, no shell quoting involved.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.inputs.len() * 2 + 6);
        for input in &self.inputs {
            args.push(format!("-{}", input.letter));
            args.push(input.file.clone());
            args.push(format!("--{}_band={}", input.letter, input.band));
        }
        args.push(format!("--calc={}", self.calc));
        args.push(format!("--outfile={}", self.outfile));
        args.push(format!("--type={OUTPUT_TYPE}"));
        args.push(format!("--co={TILED_CREATION_OPTION}"));
        args.push(String::from("--overwrite"));
        args.push(format!("--NoDataValue={}", self.nodata));
        args
    }
}

impl fmt::Display for CalculatorInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CALCULATOR_PROGRAM}")?;
        for input in &self.inputs {
            write!(f, " -{} {} --{}_band={}", input.letter, input.file, input.letter, input.band)?;
        }
        write!(
            f,
            " --calc=\"{}\" --outfile={} --type={OUTPUT_TYPE} --co=\"{TILED_CREATION_OPTION}\" --overwrite --NoDataValue={}",
            self.calc, self.outfile, self.nodata
        )
    }
}

impl From<&CalculatorInvocation> for ToolInvocation {
    fn from(value: &CalculatorInvocation) -> Self {
        ToolInvocation::new(CALCULATOR_PROGRAM, value.args()).producing(&value.outfile)
    }
}

/// A normalized difference `(b - a) / (b + a)` with pre-tuned scaling.
#[derive(Debug, Clone, Copy)]
struct BuiltinIndex {
    a: BandSymbol,
    b: BandSymbol,
}

static BUILTIN_INDEX_LOOKUP: LazyLock<HashMap<&'static str, BuiltinIndex>> = LazyLock::new(|| {
    let mut lookup = HashMap::new();
    lookup.insert("ndvi", BuiltinIndex { a: BandSymbol::Red, b: BandSymbol::Nir });
    lookup.insert("ndre", BuiltinIndex { a: BandSymbol::RedEdge, b: BandSymbol::Nir });
    lookup
});

/// Returns `true` if `index_name` is compiled from a fixed built-in definition.
pub fn is_builtin(index_name: &str) -> bool { BUILTIN_INDEX_LOOKUP.contains_key(index_name) }

/// Compiles formulas into raster-calculator invocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandCompiler {
    scaling: IndexScaling,
}

impl CommandCompiler {
    pub fn new(scaling: IndexScaling) -> Self { Self { scaling } }

    /// Builds the invocation writing `<index_name>.tif`.
    ///
    /// Built-in index names ignore `formula`. For anything else, distinct
    /// identifiers are bound to input letters `A`, `B`, … in order of first
    /// occurrence, so equal inputs always yield identical invocations.
    ///
    /// Division by zero is not detected statically: `NIR / 0` compiles and
    /// the calculator decides at run time how to fill those pixels.
    ///
    /// # Errors
    /// [`CompileError::InvalidIndexName`] for unsanitized names,
    /// [`CompileError::ReservedIndexName`] for names of system products,
    /// [`CompileError::Syntax`] for malformed formulas and
    /// [`CompileError::UnknownSymbol`] for bands the camera does not capture.
    pub fn compile(
        &self,
        index_name: &str,
        formula: &str,
        camera: CameraKind,
    ) -> Result<CalculatorInvocation, CompileError> {
        if !is_sanitized_index_name(index_name) {
            return Err(CompileError::InvalidIndexName(index_name.to_string()));
        }
        if is_reserved_name(index_name) {
            return Err(CompileError::ReservedIndexName(index_name.to_string()));
        }
        match BUILTIN_INDEX_LOOKUP.get(index_name) {
            Some(builtin) => self.compile_builtin(index_name, *builtin, camera),
            None => self.compile_formula(index_name, &parse(formula)?, camera),
        }
    }

    fn compile_builtin(
        &self,
        index_name: &str,
        builtin: BuiltinIndex,
        camera: CameraKind,
    ) -> Result<CalculatorInvocation, CompileError> {
        let band_of = |symbol: BandSymbol| {
            camera.band_index(symbol).ok_or_else(|| CompileError::UnknownSymbol(symbol.to_string()))
        };
        let inputs = vec![
            BandBinding { letter: 'A', file: PRIMARY_ORTHOPHOTO.to_string(), band: band_of(builtin.a)? },
            BandBinding { letter: 'B', file: PRIMARY_ORTHOPHOTO.to_string(), band: band_of(builtin.b)? },
        ];
        let calc = format!(
            "((asarray(B,dtype=float32)-asarray(A, dtype=float32))/(asarray(B, dtype=float32)+asarray(A, dtype=float32)) + {}) * {}",
            format_literal(self.scaling.offset),
            format_literal(self.scaling.gain),
        );
        Ok(self.invocation(index_name, inputs, calc))
    }

    fn compile_formula(
        &self,
        index_name: &str,
        expr: &Expr,
        camera: CameraKind,
    ) -> Result<CalculatorInvocation, CompileError> {
        let mut resolved = Vec::new();
        for ident in expr.identifiers() {
            let band = ident
                .parse::<BandSymbol>()
                .ok()
                .and_then(|symbol| camera.band_index(symbol).map(|band| (symbol, band)))
                .ok_or_else(|| CompileError::UnknownSymbol(ident.to_string()))?;
            resolved.push((ident, band));
        }

        // at most five distinct bands exist, so the alphabet never runs out
        let mut letters: HashMap<BandSymbol, char> = HashMap::new();
        let mut inputs = Vec::new();
        for ((symbol, band), letter) in
            resolved.iter().map(|(_, sb)| *sb).unique_by(|(symbol, _)| *symbol).zip('A'..='Z')
        {
            letters.insert(symbol, letter);
            inputs.push(BandBinding { letter, file: PRIMARY_ORTHOPHOTO.to_string(), band });
        }
        let letter_of: HashMap<&str, char> = resolved
            .iter()
            .filter_map(|(ident, (symbol, _))| letters.get(symbol).map(|l| (*ident, *l)))
            .collect();

        let rendered = expr.render(&|ident: &str| match letter_of.get(ident) {
            Some(letter) => format!("asarray({letter},dtype=float32)"),
            None => ident.to_string(),
        });
        let calc = format!(
            "(({rendered}) + {}) * {}",
            format_literal(self.scaling.offset),
            format_literal(self.scaling.gain),
        );
        Ok(self.invocation(index_name, inputs, calc))
    }

    fn invocation(
        &self,
        index_name: &str,
        inputs: Vec<BandBinding>,
        calc: String,
    ) -> CalculatorInvocation {
        CalculatorInvocation {
            inputs,
            calc,
            outfile: format!("{index_name}.tif"),
            nodata: self.scaling.nodata,
        }
    }
}
