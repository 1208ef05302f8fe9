//! Built-in spreadsheet functions.
//!
//! Conventions:
//! - Spreadsheet-facing names are ALL CAPS; [`preprocess_formula`] upper-cases
//!   any name listed in [`BUILTINS`], so `sum(` and `SUM(` are the same call.
//! - `CELL(row, col)` and `RANGE(r1, c1, r2, c2)` are the accessors cell
//!   references are rewritten into. They read the shared grid live and
//!   evaluate referenced formulas recursively.
//! - Aggregates are variadic and flatten ranges; text and empty cells inside a
//!   range are skipped.
//!
//! [`preprocess_formula`]: crate::engine::preprocess_formula

use rand::Rng;
use rhai::{Array, Dynamic, Engine, EvalAltResult, NativeCallContext, Position};

use crate::engine::{CellAddress, CellValue, Grid, MAX_RANGE_CELLS, preprocess_formula};

pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "SUM", description: "Sum of numeric arguments and ranges" },
    Builtin { name: "AVERAGE", description: "Mean of numeric arguments and ranges" },
    Builtin { name: "AVG", description: "Alias of AVERAGE" },
    Builtin { name: "MIN", description: "Smallest numeric argument" },
    Builtin { name: "MAX", description: "Largest numeric argument" },
    Builtin { name: "COUNT", description: "Number of numeric arguments" },
    Builtin { name: "ABS", description: "Absolute value" },
    Builtin { name: "ROUND", description: "Round to a number of decimal places" },
    Builtin { name: "IF", description: "IF(condition, then, else)" },
    Builtin { name: "LEN", description: "Length of the text form of a value" },
    Builtin { name: "UPPER", description: "Upper-case text" },
    Builtin { name: "LOWER", description: "Lower-case text" },
    Builtin { name: "CONCAT", description: "Join the text form of all arguments" },
    Builtin { name: "RAND", description: "Random number in [0, 1)" },
    Builtin { name: "RANDBETWEEN", description: "Random integer in [low, high]" },
    Builtin { name: "TODAY", description: "Current local date as YYYY-MM-DD" },
    Builtin { name: "CELL", description: "Value at (row, col)" },
    Builtin { name: "RANGE", description: "Values in a rectangle, row-major" },
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|b| b.name == name)
}

type BuiltinResult = Result<Dynamic, Box<EvalAltResult>>;

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

fn to_index(value: i64, label: &str) -> Result<usize, Box<EvalAltResult>> {
    usize::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| invalid_arg(&format!("{} must be >= 1", label)))
}

/// Value of one cell as Rhai sees it. Formulas are evaluated in place.
fn cell_dynamic(ctx: &NativeCallContext, grid: &Grid, address: CellAddress) -> BuiltinResult {
    let value = match grid.get(&address) {
        Some(entry) => entry.value().clone(),
        None => return Ok(Dynamic::UNIT),
    };

    match value {
        CellValue::Empty => Ok(Dynamic::UNIT),
        CellValue::Number(n) => Ok(Dynamic::from_float(n)),
        CellValue::Text(text) => match text.strip_prefix('=') {
            Some(expression) => ctx.engine().eval::<Dynamic>(&preprocess_formula(expression)),
            None => Ok(Dynamic::from(text)),
        },
    }
}

fn number_of(value: &Dynamic) -> Option<f64> {
    if let Ok(n) = value.as_float() {
        return Some(n);
    }
    if let Ok(n) = value.as_int() {
        return Some(n as f64);
    }
    None
}

fn collect_numbers(args: &[Dynamic], out: &mut Vec<f64>) {
    for arg in args {
        if arg.is_array() {
            if let Ok(items) = arg.clone().into_array() {
                collect_numbers(&items, out);
            }
        } else if let Some(n) = number_of(arg) {
            out.push(n);
        }
    }
}

fn numbers(args: &[Dynamic]) -> Vec<f64> {
    let mut out = Vec::with_capacity(args.len());
    collect_numbers(args, &mut out);
    out
}

fn text_of(value: &Dynamic) -> String {
    crate::engine::format_dynamic(value)
}

fn truthy(value: &Dynamic) -> bool {
    if let Ok(b) = value.as_bool() {
        return b;
    }
    if let Some(n) = number_of(value) {
        return n != 0.0;
    }
    if value.is_unit() {
        return false;
    }
    !text_of(value).is_empty()
}

fn sum(args: &[Dynamic]) -> BuiltinResult {
    Ok(Dynamic::from_float(numbers(args).iter().sum()))
}

fn average(args: &[Dynamic]) -> BuiltinResult {
    let values = numbers(args);
    if values.is_empty() {
        return Err(invalid_arg("AVERAGE of no numbers"));
    }
    Ok(Dynamic::from_float(
        values.iter().sum::<f64>() / values.len() as f64,
    ))
}

fn min(args: &[Dynamic]) -> BuiltinResult {
    let values = numbers(args);
    Ok(Dynamic::from_float(
        values.into_iter().reduce(f64::min).unwrap_or(0.0),
    ))
}

fn max(args: &[Dynamic]) -> BuiltinResult {
    let values = numbers(args);
    Ok(Dynamic::from_float(
        values.into_iter().reduce(f64::max).unwrap_or(0.0),
    ))
}

fn count(args: &[Dynamic]) -> BuiltinResult {
    Ok(Dynamic::from_int(numbers(args).len() as i64))
}

fn concat(args: &[Dynamic]) -> BuiltinResult {
    let mut out = String::new();
    for arg in args {
        if arg.is_array() {
            if let Ok(items) = arg.clone().into_array() {
                for item in &items {
                    out.push_str(&text_of(item));
                }
            }
        } else {
            out.push_str(&text_of(arg));
        }
    }
    Ok(Dynamic::from(out))
}

macro_rules! register_arity {
    ($engine:expr, $name:expr, $f:expr, $($arg:ident),+) => {
        $engine.register_fn($name, move |$($arg: Dynamic),+| -> BuiltinResult {
            $f(&[$($arg),+])
        });
    };
}

/// Register `f` under `name` for one to eight arguments.
fn register_variadic(engine: &mut Engine, name: &'static str, f: fn(&[Dynamic]) -> BuiltinResult) {
    register_arity!(engine, name, f, a);
    register_arity!(engine, name, f, a, b);
    register_arity!(engine, name, f, a, b, c);
    register_arity!(engine, name, f, a, b, c, d);
    register_arity!(engine, name, f, a, b, c, d, e);
    register_arity!(engine, name, f, a, b, c, d, e, g);
    register_arity!(engine, name, f, a, b, c, d, e, g, h);
    register_arity!(engine, name, f, a, b, c, d, e, g, h, i);
}

/// Register all built-in functions into the Rhai engine.
pub fn register_builtins(engine: &mut Engine, grid: Grid) {
    // CELL(row, col): value at a cell; empty cells read as 0 so `A1+1` works
    let grid_cell = grid.clone();
    engine.register_fn(
        "CELL",
        move |ctx: NativeCallContext, row: i64, col: i64| -> BuiltinResult {
            let address = CellAddress::new(to_index(row, "row")?, to_index(col, "column")?);
            let value = cell_dynamic(&ctx, &grid_cell, address)?;
            if value.is_unit() {
                Ok(Dynamic::from_float(0.0))
            } else {
                Ok(value)
            }
        },
    );

    // RANGE(r1, c1, r2, c2): row-major array, empty cells as ()
    let grid_range = grid;
    engine.register_fn(
        "RANGE",
        move |ctx: NativeCallContext, r1: i64, c1: i64, r2: i64, c2: i64| -> BuiltinResult {
            let (r1, r2) = (to_index(r1, "row")?, to_index(r2, "row")?);
            let (c1, c2) = (to_index(c1, "column")?, to_index(c2, "column")?);
            let (top, bottom) = (r1.min(r2), r1.max(r2));
            let (left, right) = (c1.min(c2), c1.max(c2));

            let cells = (bottom - top + 1).saturating_mul(right - left + 1);
            if cells > MAX_RANGE_CELLS {
                return Err(invalid_arg(&format!(
                    "range of {} cells exceeds {}",
                    cells, MAX_RANGE_CELLS
                )));
            }

            let mut out = Array::with_capacity(cells);
            for row in top..=bottom {
                for column in left..=right {
                    out.push(cell_dynamic(&ctx, &grid_range, CellAddress::new(row, column))?);
                }
            }
            Ok(Dynamic::from_array(out))
        },
    );

    register_variadic(engine, "SUM", sum);
    register_variadic(engine, "AVERAGE", average);
    register_variadic(engine, "AVG", average);
    register_variadic(engine, "MIN", min);
    register_variadic(engine, "MAX", max);
    register_variadic(engine, "COUNT", count);
    register_variadic(engine, "CONCAT", concat);

    // Integer literals divide like spreadsheet numbers, not like Rhai INTs.
    engine.register_fn("/", |a: i64, b: i64| -> f64 { a as f64 / b as f64 });

    engine.register_fn("ABS", |x: Dynamic| -> BuiltinResult {
        number_of(&x)
            .map(|n| Dynamic::from_float(n.abs()))
            .ok_or_else(|| invalid_arg("ABS expects a number"))
    });

    engine.register_fn("ROUND", |x: Dynamic, places: i64| -> BuiltinResult {
        let n = number_of(&x).ok_or_else(|| invalid_arg("ROUND expects a number"))?;
        let places = i32::try_from(places.clamp(-12, 12)).unwrap_or(0);
        let factor = 10f64.powi(places);
        Ok(Dynamic::from_float((n * factor).round() / factor))
    });
    engine.register_fn("ROUND", |x: Dynamic| -> BuiltinResult {
        let n = number_of(&x).ok_or_else(|| invalid_arg("ROUND expects a number"))?;
        Ok(Dynamic::from_float(n.round()))
    });

    engine.register_fn("IF", |cond: Dynamic, then: Dynamic, otherwise: Dynamic| {
        if truthy(&cond) { then } else { otherwise }
    });
    engine.register_fn("IF", |cond: Dynamic, then: Dynamic| {
        if truthy(&cond) { then } else { Dynamic::FALSE }
    });

    engine.register_fn("LEN", |x: Dynamic| -> i64 { text_of(&x).chars().count() as i64 });
    engine.register_fn("UPPER", |x: Dynamic| -> String { text_of(&x).to_uppercase() });
    engine.register_fn("LOWER", |x: Dynamic| -> String { text_of(&x).to_lowercase() });

    engine.register_fn("RAND", || -> f64 { rand::thread_rng().r#gen() });
    engine.register_fn("RANDBETWEEN", |low: i64, high: i64| -> Result<i64, Box<EvalAltResult>> {
        if low > high {
            return Err(invalid_arg("RANDBETWEEN low must be <= high"));
        }
        Ok(rand::thread_rng().gen_range(low..=high))
    });
    engine.register_fn("TODAY", || -> String {
        chrono::Local::now().format("%Y-%m-%d").to_string()
    });
}
