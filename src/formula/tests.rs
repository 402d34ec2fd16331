use super::*;
use crate::flight_control::CameraKind;
use crate::util::IndexScaling;
use rand::{Rng, rng};
use std::collections::HashMap;

const MULTIBAND_SYMBOLS: [&str; 5] = ["RED", "GREEN", "BLUE", "NIR", "REDEDGE"];
const RGB_SYMBOLS: [&str; 3] = ["red", "Green", "BLUE"];

fn random_formula(symbols: &[&str], depth: u32) -> String {
    let mut rng = rng();
    if depth == 0 || rng.random_bool(0.3) {
        return if rng.random_bool(0.75) {
            symbols[rng.random_range(0..symbols.len())].to_string()
        } else {
            format!("{}", rng.random_range(1..100))
        };
    }
    let lhs = random_formula(symbols, depth - 1);
    let rhs = random_formula(symbols, depth - 1);
    let op = ["+", "-", "*", "/"][rng.random_range(0..4)];
    match rng.random_range(0..3) {
        0 => format!("({lhs} {op} {rhs})"),
        1 => format!("-({lhs}){op}{rhs}"),
        _ => format!("{lhs} {op} {rhs}"),
    }
}

fn eval(expr: &Expr, values: &HashMap<String, f64>) -> f64 {
    match expr {
        Expr::Band(name) => values[name],
        Expr::Number(v) => *v,
        Expr::Negate(inner) => -eval(inner, values),
        Expr::Group(inner) => eval(inner, values),
        Expr::Binary { op, lhs, rhs } => {
            let (l, r) = (eval(lhs, values), eval(rhs, values));
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
            }
        }
    }
}

/// Evaluates the calculator expression of `invocation` by mapping its input
/// letters back to per-band pixel values.
fn eval_invocation(invocation: &CalculatorInvocation, pixel: &HashMap<u8, f64>) -> f64 {
    let plain = invocation.calc().replace("asarray(", "").replace(",dtype=float32)", "");
    let expr = parse(&plain).unwrap();
    let values: HashMap<String, f64> = invocation
        .inputs()
        .iter()
        .map(|input| (input.letter.to_string(), pixel[&input.band]))
        .collect();
    eval(&expr, &values)
}

#[test]
fn test_parse_precedence_and_associativity() {
    let expr = parse("a - b - c * d / 2").unwrap();
    assert_eq!(expr.to_string(), "A-B-C*D/2.0");
    let Expr::Binary { op: BinaryOp::Sub, lhs, rhs } = expr else {
        panic!("top level should be a subtraction");
    };
    assert!(matches!(*lhs, Expr::Binary { op: BinaryOp::Sub, .. }));
    assert!(matches!(*rhs, Expr::Binary { op: BinaryOp::Div, .. }));
}

#[test]
fn test_parse_groups_and_negation() {
    let expr = parse(" -( nir+Red ) * -2.5").unwrap();
    assert_eq!(expr.to_string(), "-(NIR+RED)*-2.5");
    assert_eq!(expr.identifiers(), vec!["NIR", "RED"]);
    assert!(parse(".5 + 3.").is_ok());
}

#[test]
fn test_parse_errors() {
    let cases = [
        ("", 0, SyntaxReason::EmptyInput),
        ("   ", 3, SyntaxReason::EmptyInput),
        ("(NIR - RED", 0, SyntaxReason::UnclosedParen),
        ("NIR - RED)", 9, SyntaxReason::UnmatchedCloseParen),
        ("NIR RED", 4, SyntaxReason::TrailingInput),
        ("NIR +", 5, SyntaxReason::MissingOperand),
        ("* NIR", 0, SyntaxReason::MissingOperand),
        ("NIR * / RED", 6, SyntaxReason::MissingOperand),
        ("()", 1, SyntaxReason::MissingOperand),
        ("--NIR", 1, SyntaxReason::MissingOperand),
        ("NIR ^ 2", 4, SyntaxReason::UnexpectedCharacter('^')),
        ("NIR + .", 6, SyntaxReason::MalformedNumber),
    ];
    for (text, position, reason) in cases {
        assert_eq!(parse(text), Err(SyntaxError::new(position, reason)), "formula {text:?}");
    }
}

#[test]
fn test_unknown_symbols_parse_but_do_not_compile() {
    assert!(parse("NIR + THERMAL").is_ok());
    let result = CommandCompiler::default().compile("custom", "NIR + THERMAL", CameraKind::Multiband);
    assert_eq!(result, Err(CompileError::UnknownSymbol(String::from("THERMAL"))));
}

#[test]
fn test_validator_accepts_resolvable_formulas() {
    for _ in 0..200 {
        let multiband = random_formula(&MULTIBAND_SYMBOLS, 4);
        assert!(FormulaValidator::is_valid(&multiband, CameraKind::Multiband), "{multiband}");
        let rgb = random_formula(&RGB_SYMBOLS, 4);
        assert!(FormulaValidator::is_valid(&rgb, CameraKind::Rgb), "{rgb}");
        assert!(FormulaValidator::is_valid(&rgb, CameraKind::Multiband), "{rgb}");
    }
}

#[test]
fn test_validator_rejects_unresolvable_formulas() {
    for _ in 0..200 {
        let formula = format!("({}) + NIR", random_formula(&RGB_SYMBOLS, 3));
        assert!(!FormulaValidator::is_valid(&formula, CameraKind::Rgb), "{formula}");
        let formula = format!("SWIR * ({})", random_formula(&MULTIBAND_SYMBOLS, 3));
        assert!(!FormulaValidator::is_valid(&formula, CameraKind::Multiband), "{formula}");
    }
    assert!(!FormulaValidator::is_valid("(NIR", CameraKind::Multiband));
    assert_eq!(
        FormulaValidator::check("GREEN / REDEDGE", CameraKind::Rgb),
        Err(CompileError::UnknownSymbol(String::from("REDEDGE")))
    );
}

#[test]
fn test_compile_is_deterministic() {
    let compiler = CommandCompiler::default();
    for _ in 0..100 {
        let formula = random_formula(&MULTIBAND_SYMBOLS, 5);
        let first = compiler.compile("det", &formula, CameraKind::Multiband).unwrap();
        let second = compiler.compile("det", &formula, CameraKind::Multiband).unwrap();
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(first.args(), second.args());
    }
}

#[test]
fn test_compiled_expression_matches_formula() {
    let compiler = CommandCompiler::new(IndexScaling { offset: 0.0, gain: 1.0, nodata: -1 });
    let mut rng = rng();
    for _ in 0..100 {
        let formula = random_formula(&MULTIBAND_SYMBOLS, 4);
        let invocation = compiler.compile("check", &formula, CameraKind::Multiband).unwrap();
        let pixel: HashMap<u8, f64> = (1..=5).map(|b| (b, rng.random_range(1.0..1000.0))).collect();
        let symbol_values: HashMap<String, f64> = MULTIBAND_SYMBOLS
            .iter()
            .map(|s| {
                let band = CameraKind::Multiband.band_index(s.parse().unwrap()).unwrap();
                (s.to_string(), pixel[&band])
            })
            .collect();
        let expected = eval(&parse(&formula).unwrap(), &symbol_values);
        let actual = eval_invocation(&invocation, &pixel);
        assert!(
            (expected.is_nan() && actual.is_nan()) || expected == actual,
            "{formula}: expected {expected}, got {actual}"
        );
    }
}

#[test]
fn test_commutative_reorder_changes_letters_not_result() {
    let compiler = CommandCompiler::default();
    let forward = compiler.compile("sum", "NIR + RED", CameraKind::Multiband).unwrap();
    let backward = compiler.compile("sum", "RED + NIR", CameraKind::Multiband).unwrap();
    assert_ne!(forward.to_string(), backward.to_string());
    assert_eq!(forward.inputs()[0].band, 4);
    assert_eq!(backward.inputs()[0].band, 3);

    let pixel = HashMap::from([(3, 41.0), (4, 97.0)]);
    assert_eq!(eval_invocation(&forward, &pixel), eval_invocation(&backward, &pixel));
}

#[test]
fn test_custom_normalized_difference_invocation() {
    let invocation = CommandCompiler::default()
        .compile("customveg", "(NIR-RED)/(NIR+RED)", CameraKind::Multiband)
        .unwrap();
    assert_eq!(invocation.outfile(), "customveg.tif");
    assert_eq!(invocation.nodata(), -1);
    assert_eq!(
        invocation.inputs(),
        &[
            BandBinding { letter: 'A', file: PRIMARY_ORTHOPHOTO.to_string(), band: 4 },
            BandBinding { letter: 'B', file: PRIMARY_ORTHOPHOTO.to_string(), band: 3 },
        ]
    );
    assert_eq!(
        invocation.to_string(),
        "gdal_calc.py -A odm_orthophoto.tif --A_band=4 -B odm_orthophoto.tif --B_band=3 \
         --calc=\"(((asarray(A,dtype=float32)-asarray(B,dtype=float32))/(asarray(A,dtype=float32)+asarray(B,dtype=float32))) + 1.0) * 127.0\" \
         --outfile=customveg.tif --type=Byte --co=\"TILED=YES\" --overwrite --NoDataValue=-1"
    );

    // a ratio of -1, 0 and 1 lands on the byte range ends and its center
    for (nir, red, scaled) in [(0.0, 10.0, 0.0), (10.0, 10.0, 127.0), (10.0, 0.0, 254.0)] {
        let pixel = HashMap::from([(3, red), (4, nir)]);
        assert_eq!(eval_invocation(&invocation, &pixel), scaled);
    }
}

#[test]
fn test_division_by_zero_is_not_rejected() {
    let invocation = CommandCompiler::default()
        .compile("zero", "NIR / 0", CameraKind::Multiband)
        .unwrap();
    assert!(invocation.calc().contains("asarray(A,dtype=float32)/0.0"));
}

#[test]
fn test_builtins_bypass_parser() {
    let compiler = CommandCompiler::default();
    let ndvi = compiler.compile("ndvi", "this is not a formula (", CameraKind::Multiband).unwrap();
    assert_eq!(
        ndvi.to_string(),
        "gdal_calc.py -A odm_orthophoto.tif --A_band=3 -B odm_orthophoto.tif --B_band=4 \
         --calc=\"((asarray(B,dtype=float32)-asarray(A, dtype=float32))/(asarray(B, dtype=float32)+asarray(A, dtype=float32)) + 1.0) * 127.0\" \
         --outfile=ndvi.tif --type=Byte --co=\"TILED=YES\" --overwrite --NoDataValue=-1"
    );
    let ndre = compiler.compile("ndre", "", CameraKind::Multiband).unwrap();
    assert_eq!(ndre.inputs()[0].band, 5);
    assert_eq!(ndre.inputs()[1].band, 4);
    assert!(is_builtin("ndre") && !is_builtin("customveg"));
    assert_eq!(
        compiler.compile("ndvi", "", CameraKind::Rgb),
        Err(CompileError::UnknownSymbol(String::from("NIR")))
    );
}

#[test]
fn test_scaling_is_configurable() {
    let compiler = CommandCompiler::new(IndexScaling { offset: 0.5, gain: 100.0, nodata: 255 });
    let invocation = compiler.compile("ndvi", "", CameraKind::Multiband).unwrap();
    assert!(invocation.calc().ends_with("+ 0.5) * 100.0"));
    assert!(invocation.args().contains(&String::from("--NoDataValue=255")));
}

#[test]
fn test_sanitize_index_name() {
    assert_eq!(sanitize_index_name("Soil Index!").as_deref(), Some("soilindex"));
    assert_eq!(sanitize_index_name("../../etc/passwd").as_deref(), Some("etcpasswd"));
    assert_eq!(sanitize_index_name("ndvi_2024-v2").as_deref(), Some("ndvi_2024-v2"));
    assert_eq!(sanitize_index_name("$(rm -rf)"), Some(String::from("rm-rf")));
    assert_eq!(sanitize_index_name("!!!"), None);
    assert_eq!(
        CommandCompiler::default().compile("Soil Index!", "NIR", CameraKind::Multiband),
        Err(CompileError::InvalidIndexName(String::from("Soil Index!")))
    );
}

#[test]
fn test_reserved_index_names_never_compile() {
    let compiler = CommandCompiler::default();
    for name in ["odm_orthophoto", "rgb", "mainortho", "dsm", "colorbar"] {
        assert!(is_reserved_name(name));
        assert_eq!(
            compiler.compile(name, "NIR", CameraKind::Multiband),
            Err(CompileError::ReservedIndexName(name.to_string()))
        );
    }
    assert_eq!(
        compiler.compile("ndvi", "", CameraKind::Multiband).unwrap().outfile(),
        "ndvi.tif"
    );
    assert!(!is_reserved_name("odm_orthophoto2"));
}
