use std::cmp::Ordering;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::button::ButtonTag;
use crate::errors::CalcError;

/// How many operands an operator consumes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Produces a value out of nothing: pi, e, random number, memory recall
    Constant,
    /// Postfix function applied to the current value
    Unary,
    /// Infix operator combining the left operand with the next one
    Binary,
    /// Equality, parentheses, and the keys that drive memory or modes
    Control,
}

/// Binary operators fall into two tiers; within a tier they associate left
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Additive,
    Multiplicative,
}

/// Every operation the calculator brain knows. Digits and the decimal
/// separator are not operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// x^y
    Power,
    /// y^x: the second operand raised to the first one
    PowerReversed,
    /// y-th root of x
    Root,
    /// logarithm of x with base y
    LogBase,
    /// x * 10^y, scientific notation entry
    Exponent,

    Negate,
    Percent,
    Square,
    Cube,
    Exp,
    Exp10,
    Exp2,
    Reciprocal,
    Sqrt,
    Cbrt,
    Ln,
    Log10,
    Log2,
    Factorial,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,

    Pi,
    E,
    Rand,
    MemoryRead,

    Equals,
    OpenParenthesis,
    CloseParenthesis,
    MemoryClear,
    MemoryPlus,
    MemoryMinus,
    ArithmeticClear,
    Clear,
    SecondaryToggle,
    Radian,
    Degree,
}

lazy_static! {
    static ref ALL_OPERATORS: Vec<Operator> = ButtonTag::all()
        .iter()
        .filter_map(|tag| Operator::from_button(*tag))
        .collect();
    static ref OPERATOR_NAMES: HashMap<&'static str, Operator> = ALL_OPERATORS
        .iter()
        .map(|op| (op.name(), *op))
        .collect();
}

impl Operator {
    /// Returns the operator bound to a keypad button. Digits and the
    /// decimal separator do not have one.
    pub fn operator_for(tag: ButtonTag) -> Result<Operator, CalcError> {
        Operator::from_button(tag).ok_or(CalcError::NotAnOperator(tag))
    }

    /// Same as `operator_for` but starts from a raw integer tag
    pub fn from_tag(tag: i64) -> Result<Operator, CalcError> {
        Operator::operator_for(ButtonTag::try_from(tag)?)
    }

    pub(crate) fn from_button(tag: ButtonTag) -> Option<Operator> {
        let op = match tag {
            ButtonTag::Zero
            | ButtonTag::One
            | ButtonTag::Two
            | ButtonTag::Three
            | ButtonTag::Four
            | ButtonTag::Five
            | ButtonTag::Six
            | ButtonTag::Seven
            | ButtonTag::Eight
            | ButtonTag::Nine
            | ButtonTag::DecimalSeparator => return None,
            ButtonTag::Addition => Operator::Add,
            ButtonTag::Subtraction => Operator::Subtract,
            ButtonTag::Multiplication => Operator::Multiply,
            ButtonTag::Division => Operator::Divide,
            ButtonTag::Equality => Operator::Equals,
            ButtonTag::ArithmeticClear => Operator::ArithmeticClear,
            ButtonTag::Clear => Operator::Clear,
            ButtonTag::SignToggle => Operator::Negate,
            ButtonTag::Percentage => Operator::Percent,
            ButtonTag::OpeningParenthesis => Operator::OpenParenthesis,
            ButtonTag::ClosingParenthesis => Operator::CloseParenthesis,
            ButtonTag::MemoryClear => Operator::MemoryClear,
            ButtonTag::MemoryPlus => Operator::MemoryPlus,
            ButtonTag::MemoryMinus => Operator::MemoryMinus,
            ButtonTag::MemoryRead => Operator::MemoryRead,
            ButtonTag::SecondaryFunctionalToggle => Operator::SecondaryToggle,
            ButtonTag::XSquared => Operator::Square,
            ButtonTag::XCubed => Operator::Cube,
            ButtonTag::XPowerY => Operator::Power,
            ButtonTag::EulerNumberPowerX => Operator::Exp,
            ButtonTag::YPowerX => Operator::PowerReversed,
            ButtonTag::TenPowerX => Operator::Exp10,
            ButtonTag::TwoPowerX => Operator::Exp2,
            ButtonTag::OneOverX => Operator::Reciprocal,
            ButtonTag::SquareRootOfX => Operator::Sqrt,
            ButtonTag::CubicRootOfX => Operator::Cbrt,
            ButtonTag::YthRootOfX => Operator::Root,
            ButtonTag::NaturalLogarithm => Operator::Ln,
            ButtonTag::LogarithmBaseYOfX => Operator::LogBase,
            ButtonTag::CommonLogarithm => Operator::Log10,
            ButtonTag::LogarithmBaseTwo => Operator::Log2,
            ButtonTag::XFactorial => Operator::Factorial,
            ButtonTag::Sin => Operator::Sin,
            ButtonTag::Cos => Operator::Cos,
            ButtonTag::Tan => Operator::Tan,
            ButtonTag::ArcSin => Operator::Asin,
            ButtonTag::ArcCos => Operator::Acos,
            ButtonTag::ArcTan => Operator::Atan,
            ButtonTag::Sinh => Operator::Sinh,
            ButtonTag::Cosh => Operator::Cosh,
            ButtonTag::Tanh => Operator::Tanh,
            ButtonTag::ArcSinh => Operator::Asinh,
            ButtonTag::ArcCosh => Operator::Acosh,
            ButtonTag::ArcTanh => Operator::Atanh,
            ButtonTag::Pi => Operator::Pi,
            ButtonTag::EulerNumber => Operator::E,
            ButtonTag::Rand => Operator::Rand,
            ButtonTag::EE => Operator::Exponent,
            ButtonTag::Rad => Operator::Radian,
            ButtonTag::Deg => Operator::Degree,
        };
        Some(op)
    }

    /// All operators, in keypad order
    pub fn all() -> &'static [Operator] {
        &ALL_OPERATORS
    }

    /// The keypad button that triggers the operator
    pub fn button(self) -> ButtonTag {
        match self {
            Operator::Add => ButtonTag::Addition,
            Operator::Subtract => ButtonTag::Subtraction,
            Operator::Multiply => ButtonTag::Multiplication,
            Operator::Divide => ButtonTag::Division,
            Operator::Power => ButtonTag::XPowerY,
            Operator::PowerReversed => ButtonTag::YPowerX,
            Operator::Root => ButtonTag::YthRootOfX,
            Operator::LogBase => ButtonTag::LogarithmBaseYOfX,
            Operator::Exponent => ButtonTag::EE,
            Operator::Negate => ButtonTag::SignToggle,
            Operator::Percent => ButtonTag::Percentage,
            Operator::Square => ButtonTag::XSquared,
            Operator::Cube => ButtonTag::XCubed,
            Operator::Exp => ButtonTag::EulerNumberPowerX,
            Operator::Exp10 => ButtonTag::TenPowerX,
            Operator::Exp2 => ButtonTag::TwoPowerX,
            Operator::Reciprocal => ButtonTag::OneOverX,
            Operator::Sqrt => ButtonTag::SquareRootOfX,
            Operator::Cbrt => ButtonTag::CubicRootOfX,
            Operator::Ln => ButtonTag::NaturalLogarithm,
            Operator::Log10 => ButtonTag::CommonLogarithm,
            Operator::Log2 => ButtonTag::LogarithmBaseTwo,
            Operator::Factorial => ButtonTag::XFactorial,
            Operator::Sin => ButtonTag::Sin,
            Operator::Cos => ButtonTag::Cos,
            Operator::Tan => ButtonTag::Tan,
            Operator::Asin => ButtonTag::ArcSin,
            Operator::Acos => ButtonTag::ArcCos,
            Operator::Atan => ButtonTag::ArcTan,
            Operator::Sinh => ButtonTag::Sinh,
            Operator::Cosh => ButtonTag::Cosh,
            Operator::Tanh => ButtonTag::Tanh,
            Operator::Asinh => ButtonTag::ArcSinh,
            Operator::Acosh => ButtonTag::ArcCosh,
            Operator::Atanh => ButtonTag::ArcTanh,
            Operator::Pi => ButtonTag::Pi,
            Operator::E => ButtonTag::EulerNumber,
            Operator::Rand => ButtonTag::Rand,
            Operator::MemoryRead => ButtonTag::MemoryRead,
            Operator::Equals => ButtonTag::Equality,
            Operator::OpenParenthesis => ButtonTag::OpeningParenthesis,
            Operator::CloseParenthesis => ButtonTag::ClosingParenthesis,
            Operator::MemoryClear => ButtonTag::MemoryClear,
            Operator::MemoryPlus => ButtonTag::MemoryPlus,
            Operator::MemoryMinus => ButtonTag::MemoryMinus,
            Operator::ArithmeticClear => ButtonTag::ArithmeticClear,
            Operator::Clear => ButtonTag::Clear,
            Operator::SecondaryToggle => ButtonTag::SecondaryFunctionalToggle,
            Operator::Radian => ButtonTag::Rad,
            Operator::Degree => ButtonTag::Deg,
        }
    }

    /// Stable lowercase identifier used for parsing and persistence
    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "add",
            Operator::Subtract => "sub",
            Operator::Multiply => "mul",
            Operator::Divide => "div",
            Operator::Power => "pow",
            Operator::PowerReversed => "rpow",
            Operator::Root => "root",
            Operator::LogBase => "logy",
            Operator::Exponent => "ee",
            Operator::Negate => "neg",
            Operator::Percent => "percent",
            Operator::Square => "sqr",
            Operator::Cube => "cube",
            Operator::Exp => "exp",
            Operator::Exp10 => "exp10",
            Operator::Exp2 => "exp2",
            Operator::Reciprocal => "inv",
            Operator::Sqrt => "sqrt",
            Operator::Cbrt => "cbrt",
            Operator::Ln => "ln",
            Operator::Log10 => "log10",
            Operator::Log2 => "log2",
            Operator::Factorial => "fact",
            Operator::Sin => "sin",
            Operator::Cos => "cos",
            Operator::Tan => "tan",
            Operator::Asin => "asin",
            Operator::Acos => "acos",
            Operator::Atan => "atan",
            Operator::Sinh => "sinh",
            Operator::Cosh => "cosh",
            Operator::Tanh => "tanh",
            Operator::Asinh => "asinh",
            Operator::Acosh => "acosh",
            Operator::Atanh => "atanh",
            Operator::Pi => "pi",
            Operator::E => "e",
            Operator::Rand => "rand",
            Operator::MemoryRead => "mr",
            Operator::Equals => "eq",
            Operator::OpenParenthesis => "(",
            Operator::CloseParenthesis => ")",
            Operator::MemoryClear => "mc",
            Operator::MemoryPlus => "m+",
            Operator::MemoryMinus => "m-",
            Operator::ArithmeticClear => "ac",
            Operator::Clear => "c",
            Operator::SecondaryToggle => "2nd",
            Operator::Radian => "rad",
            Operator::Degree => "deg",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Operator::Add
            | Operator::Subtract
            | Operator::Multiply
            | Operator::Divide
            | Operator::Power
            | Operator::PowerReversed
            | Operator::Root
            | Operator::LogBase
            | Operator::Exponent => Arity::Binary,
            Operator::Pi | Operator::E | Operator::Rand | Operator::MemoryRead => Arity::Constant,
            Operator::Equals
            | Operator::OpenParenthesis
            | Operator::CloseParenthesis
            | Operator::MemoryClear
            | Operator::MemoryPlus
            | Operator::MemoryMinus
            | Operator::ArithmeticClear
            | Operator::Clear
            | Operator::SecondaryToggle
            | Operator::Radian
            | Operator::Degree => Arity::Control,
            _ => Arity::Unary,
        }
    }

    /// Precedence tier of a binary operator. `None` for anything else
    pub fn precedence(self) -> Option<Precedence> {
        match self {
            Operator::Add | Operator::Subtract => Some(Precedence::Additive),
            Operator::Multiply
            | Operator::Divide
            | Operator::Power
            | Operator::PowerReversed
            | Operator::Root
            | Operator::LogBase
            | Operator::Exponent => Some(Precedence::Multiplicative),
            _ => None,
        }
    }

    /// Compares the priority of two binary operators. Returns `None` when
    /// either side is not binary: parentheses and functions never take part
    /// in precedence comparison.
    pub fn compare_precedence(&self, other: &Operator) -> Option<Ordering> {
        match (self.precedence(), other.precedence()) {
            (Some(p1), Some(p2)) => Some(p1.cmp(&p2)),
            _ => None,
        }
    }

    pub fn is_opening_parenthesis(self) -> bool {
        self == Operator::OpenParenthesis
    }

    pub fn is_closing_parenthesis(self) -> bool {
        self == Operator::CloseParenthesis
    }

    pub fn is_parenthesis(self) -> bool {
        self.is_opening_parenthesis() || self.is_closing_parenthesis()
    }

    pub fn is_unary(self) -> bool {
        self.arity() == Arity::Unary
    }

    pub fn is_binary(self) -> bool {
        self.arity() == Arity::Binary
    }

    pub fn is_constant(self) -> bool {
        self.arity() == Arity::Constant
    }

    pub fn is_control(self) -> bool {
        self.arity() == Arity::Control
    }

    /// Control keys that act on the brain itself (memory, clearing, modes)
    /// rather than on the expression
    pub fn is_command(self) -> bool {
        self.is_control() && !self.is_parenthesis() && self != Operator::Equals
    }

    /// True if the operator leaves the expression expecting an operand
    pub fn awaits_operand(self) -> bool {
        self.is_binary() || self.is_opening_parenthesis()
    }

    /// Trigonometric functions whose argument or result is an angle
    pub fn uses_angle(self) -> bool {
        matches!(
            self,
            Operator::Sin
                | Operator::Cos
                | Operator::Tan
                | Operator::Asin
                | Operator::Acos
                | Operator::Atan
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let low = s.to_lowercase();
        OPERATOR_NAMES
            .get(low.as_str())
            .copied()
            .ok_or_else(|| format!("Invalid operator '{}'", s))
    }
}

impl TryFrom<String> for Operator {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> String {
        op.name().to_string()
    }
}
