use std::f64::consts;
use std::fmt;

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::operator::Operator;
use crate::value::{ensure_finite, f64_equal, format_f64, is_integer};

/// Interpretation of angles taken or returned by trigonometric functions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    Radian,
    #[default]
    Degree,
}

impl AngleMode {
    pub fn toggled(self) -> Self {
        match self {
            AngleMode::Radian => AngleMode::Degree,
            AngleMode::Degree => AngleMode::Radian,
        }
    }

    fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Radian => angle,
            AngleMode::Degree => angle.to_radians(),
        }
    }

    fn from_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Radian => angle,
            AngleMode::Degree => angle.to_degrees(),
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AngleMode::Radian => write!(f, "rad"),
            AngleMode::Degree => write!(f, "deg"),
        }
    }
}

/// Factorial of 171 and above does not fit into f64
pub const MAX_FACTORIAL: u32 = 170;

fn invalid(func: &str, x: f64) -> CalcError {
    CalcError::InvalidArgument(func.to_string(), format_f64(x))
}

// In degree mode sine and cosine of the multiples of 90 degrees are exact;
// converting them to radians first would leave a residue like 6.1e-17.
macro_rules! sin_cos {
    ($id:ident, $zero_at:expr) => {
        fn $id(x: f64, mode: AngleMode) -> CalcResult {
            if mode == AngleMode::Degree && (x - $zero_at) % 180.0 == 0.0 {
                return Ok(0.0);
            }
            ensure_finite(stringify!($id), mode.to_radians(x).$id())
        }
    };
}

macro_rules! asin_cos {
    ($id:ident) => {
        fn $id(x: f64, mode: AngleMode) -> CalcResult {
            if !(-1.0..=1.0).contains(&x) {
                return Err(invalid(stringify!($id), x));
            }
            Ok(mode.from_radians(x.$id()))
        }
    };
}

macro_rules! fn_hyper {
    ($id:ident) => {
        fn $id(x: f64) -> CalcResult {
            ensure_finite(stringify!($id), x.$id())
        }
    };
}

macro_rules! fn_log {
    ($id:ident) => {
        fn $id(x: f64) -> CalcResult {
            if x <= 0.0 {
                return Err(invalid(stringify!($id), x));
            }
            ensure_finite(stringify!($id), x.$id())
        }
    };
}

sin_cos!(sin, 0.0);
sin_cos!(cos, 90.0);
asin_cos!(asin);
asin_cos!(acos);
fn_hyper!(sinh);
fn_hyper!(cosh);
fn_hyper!(tanh);
fn_hyper!(asinh);
fn_log!(ln);
fn_log!(log10);
fn_log!(log2);

fn tan(x: f64, mode: AngleMode) -> CalcResult {
    let undefined = match mode {
        AngleMode::Degree => x.abs() % 180.0 == 90.0,
        AngleMode::Radian => {
            let half = consts::FRAC_PI_2;
            let k = (x / half).round();
            k % 2.0 != 0.0 && f64_equal(k * half, x)
        }
    };
    if undefined {
        return Err(invalid("tan", x));
    }
    if mode == AngleMode::Degree && x % 180.0 == 0.0 {
        return Ok(0.0);
    }
    ensure_finite("tan", mode.to_radians(x).tan())
}

fn atan(x: f64, mode: AngleMode) -> CalcResult {
    ensure_finite("atan", mode.from_radians(x.atan()))
}

fn acosh(x: f64) -> CalcResult {
    if x < 1.0 {
        return Err(invalid("acosh", x));
    }
    ensure_finite("acosh", x.acosh())
}

fn atanh(x: f64) -> CalcResult {
    if x <= -1.0 || x >= 1.0 {
        return Err(invalid("atanh", x));
    }
    ensure_finite("atanh", x.atanh())
}

fn sqrt(x: f64) -> CalcResult {
    if x < 0.0 {
        return Err(CalcError::NotForNegative("sqrt".to_owned()));
    }
    Ok(x.sqrt())
}

fn reciprocal(x: f64) -> CalcResult {
    if x == 0.0 {
        return Err(CalcError::DividedByZero("1".to_owned()));
    }
    ensure_finite("inv", 1.0 / x)
}

pub(crate) fn factorial(x: f64, limit: u32) -> CalcResult {
    if x < 0.0 {
        return Err(CalcError::NotForNegative("factorial".to_owned()));
    }
    if !is_integer(x) {
        return Err(CalcError::OnlyInt("factorial".to_owned()));
    }
    let n = match x.to_u32() {
        Some(n) if n <= limit => n,
        _ => return Err(CalcError::NotFinite("factorial".to_owned())),
    };
    Ok((2..=n).fold(1.0, |acc, i| acc * f64::from(i)))
}

/// Applies a unary function to `x`
pub(crate) fn unary(op: Operator, x: f64, mode: AngleMode, factorial_limit: u32) -> CalcResult {
    match op {
        Operator::Negate => Ok(-x),
        Operator::Percent => Ok(x / 100.0),
        Operator::Square => ensure_finite("sqr", x * x),
        Operator::Cube => ensure_finite("cube", x * x * x),
        Operator::Exp => ensure_finite("exp", x.exp()),
        Operator::Exp10 => ensure_finite("exp10", 10f64.powf(x)),
        Operator::Exp2 => ensure_finite("exp2", x.exp2()),
        Operator::Reciprocal => reciprocal(x),
        Operator::Sqrt => sqrt(x),
        Operator::Cbrt => Ok(x.cbrt()),
        Operator::Ln => ln(x),
        Operator::Log10 => log10(x),
        Operator::Log2 => log2(x),
        Operator::Factorial => factorial(x, factorial_limit),
        Operator::Sin => sin(x, mode),
        Operator::Cos => cos(x, mode),
        Operator::Tan => tan(x, mode),
        Operator::Asin => asin(x, mode),
        Operator::Acos => acos(x, mode),
        Operator::Atan => atan(x, mode),
        Operator::Sinh => sinh(x),
        Operator::Cosh => cosh(x),
        Operator::Tanh => tanh(x),
        Operator::Asinh => asinh(x),
        Operator::Acosh => acosh(x),
        Operator::Atanh => atanh(x),
        _ => Err(CalcError::InvalidOp(op)),
    }
}

fn divide(lhs: f64, rhs: f64) -> CalcResult {
    if rhs == 0.0 {
        return Err(CalcError::DividedByZero(format_f64(lhs)));
    }
    ensure_finite("div", lhs / rhs)
}

fn power(base: f64, exp: f64) -> CalcResult {
    if base == 0.0 && exp < 0.0 {
        return Err(CalcError::DividedByZero("1".to_owned()));
    }
    if base < 0.0 && !is_integer(exp) {
        return Err(CalcError::NotForNegative("pow".to_owned()));
    }
    ensure_finite("pow", base.powf(exp))
}

// odd roots of negative numbers are real: the cube root of -8 is -2
fn root(x: f64, degree: f64) -> CalcResult {
    if degree == 0.0 {
        return Err(invalid("root", degree));
    }
    if x < 0.0 {
        if is_integer(degree) && degree % 2.0 != 0.0 {
            return ensure_finite("root", -(-x).powf(1.0 / degree));
        }
        return Err(CalcError::NotForNegative("root".to_owned()));
    }
    power(x, 1.0 / degree)
}

fn log_base(x: f64, base: f64) -> CalcResult {
    if x <= 0.0 {
        return Err(invalid("logy", x));
    }
    if base <= 0.0 || base == 1.0 {
        return Err(invalid("logy", base));
    }
    ensure_finite("logy", x.ln() / base.ln())
}

/// Applies a binary operator to `lhs` and `rhs`
pub(crate) fn binary(op: Operator, lhs: f64, rhs: f64) -> CalcResult {
    match op {
        Operator::Add => ensure_finite("add", lhs + rhs),
        Operator::Subtract => ensure_finite("sub", lhs - rhs),
        Operator::Multiply => ensure_finite("mul", lhs * rhs),
        Operator::Divide => divide(lhs, rhs),
        Operator::Power => power(lhs, rhs),
        Operator::PowerReversed => power(rhs, lhs),
        Operator::Root => root(lhs, rhs),
        Operator::LogBase => log_base(lhs, rhs),
        Operator::Exponent => ensure_finite("ee", lhs * 10f64.powf(rhs)),
        _ => Err(CalcError::InvalidOp(op)),
    }
}
