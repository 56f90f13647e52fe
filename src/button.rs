use std::convert::TryFrom;
use std::fmt;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::errors::CalcError;
use crate::operator::Operator;

/// Every key of the calculator keypad. The discriminants are the integer tags
/// the keypad assigns to its buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(i64)]
pub enum ButtonTag {
    Zero = 0,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    DecimalSeparator,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Equality,
    ArithmeticClear,
    Clear,
    SignToggle,
    Percentage,
    OpeningParenthesis,
    ClosingParenthesis,
    MemoryClear,
    MemoryPlus,
    MemoryMinus,
    MemoryRead,
    SecondaryFunctionalToggle,
    XSquared,
    XCubed,
    XPowerY,
    EulerNumberPowerX,
    YPowerX,
    TenPowerX,
    TwoPowerX,
    OneOverX,
    SquareRootOfX,
    CubicRootOfX,
    YthRootOfX,
    NaturalLogarithm,
    LogarithmBaseYOfX,
    CommonLogarithm,
    LogarithmBaseTwo,
    XFactorial,
    Sin,
    Cos,
    Tan,
    ArcSin,
    ArcCos,
    ArcTan,
    Sinh,
    Cosh,
    Tanh,
    ArcSinh,
    ArcCosh,
    ArcTanh,
    Pi,
    EulerNumber,
    Rand,
    EE,
    Rad,
    Deg,
}

lazy_static! {
    static ref ALL_TAGS: Vec<ButtonTag> = (0i64..)
        .map_while(|tag| ButtonTag::try_from(tag).ok())
        .collect();
}

/// A single decimal digit typed on the keypad
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Digit(u8);

impl Digit {
    pub fn new(value: u8) -> Option<Self> {
        if value <= 9 {
            Some(Digit(value))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// The role a button plays: digits and the decimal separator build operands
/// on the caller's side, everything else is handed to the calculator brain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Digit(Digit),
    DecimalSeparator,
    Operator(Operator),
}

impl ButtonTag {
    /// All keypad buttons ordered by tag
    pub fn all() -> &'static [ButtonTag] {
        &ALL_TAGS
    }

    pub fn tag(self) -> i64 {
        self as i64
    }

    pub fn key(self) -> Key {
        match Operator::from_button(self) {
            Some(op) => Key::Operator(op),
            None if self == ButtonTag::DecimalSeparator => Key::DecimalSeparator,
            None => Key::Digit(Digit(self as u8)),
        }
    }

    /// Text printed on the button
    pub fn label(self) -> &'static str {
        match self {
            ButtonTag::Zero => "0",
            ButtonTag::One => "1",
            ButtonTag::Two => "2",
            ButtonTag::Three => "3",
            ButtonTag::Four => "4",
            ButtonTag::Five => "5",
            ButtonTag::Six => "6",
            ButtonTag::Seven => "7",
            ButtonTag::Eight => "8",
            ButtonTag::Nine => "9",
            ButtonTag::DecimalSeparator => ".",
            ButtonTag::Addition => "+",
            ButtonTag::Subtraction => "−",
            ButtonTag::Multiplication => "×",
            ButtonTag::Division => "÷",
            ButtonTag::Equality => "=",
            ButtonTag::ArithmeticClear => "AC",
            ButtonTag::Clear => "C",
            ButtonTag::SignToggle => "+/−",
            ButtonTag::Percentage => "%",
            ButtonTag::OpeningParenthesis => "(",
            ButtonTag::ClosingParenthesis => ")",
            ButtonTag::MemoryClear => "mc",
            ButtonTag::MemoryPlus => "m+",
            ButtonTag::MemoryMinus => "m−",
            ButtonTag::MemoryRead => "mr",
            ButtonTag::SecondaryFunctionalToggle => "2nd",
            ButtonTag::XSquared => "x²",
            ButtonTag::XCubed => "x³",
            ButtonTag::XPowerY => "xʸ",
            ButtonTag::EulerNumberPowerX => "eˣ",
            ButtonTag::YPowerX => "yˣ",
            ButtonTag::TenPowerX => "10ˣ",
            ButtonTag::TwoPowerX => "2ˣ",
            ButtonTag::OneOverX => "1/x",
            ButtonTag::SquareRootOfX => "√x",
            ButtonTag::CubicRootOfX => "∛x",
            ButtonTag::YthRootOfX => "ʸ√x",
            ButtonTag::NaturalLogarithm => "ln",
            ButtonTag::LogarithmBaseYOfX => "logᵧ",
            ButtonTag::CommonLogarithm => "log₁₀",
            ButtonTag::LogarithmBaseTwo => "log₂",
            ButtonTag::XFactorial => "x!",
            ButtonTag::Sin => "sin",
            ButtonTag::Cos => "cos",
            ButtonTag::Tan => "tan",
            ButtonTag::ArcSin => "sin⁻¹",
            ButtonTag::ArcCos => "cos⁻¹",
            ButtonTag::ArcTan => "tan⁻¹",
            ButtonTag::Sinh => "sinh",
            ButtonTag::Cosh => "cosh",
            ButtonTag::Tanh => "tanh",
            ButtonTag::ArcSinh => "sinh⁻¹",
            ButtonTag::ArcCosh => "cosh⁻¹",
            ButtonTag::ArcTanh => "tanh⁻¹",
            ButtonTag::Pi => "π",
            ButtonTag::EulerNumber => "e",
            ButtonTag::Rand => "Rand",
            ButtonTag::EE => "EE",
            ButtonTag::Rad => "Rad",
            ButtonTag::Deg => "Deg",
        }
    }
}

impl TryFrom<i64> for ButtonTag {
    type Error = CalcError;

    fn try_from(tag: i64) -> Result<Self, Self::Error> {
        let button = match tag {
            0 => ButtonTag::Zero,
            1 => ButtonTag::One,
            2 => ButtonTag::Two,
            3 => ButtonTag::Three,
            4 => ButtonTag::Four,
            5 => ButtonTag::Five,
            6 => ButtonTag::Six,
            7 => ButtonTag::Seven,
            8 => ButtonTag::Eight,
            9 => ButtonTag::Nine,
            10 => ButtonTag::DecimalSeparator,
            11 => ButtonTag::Addition,
            12 => ButtonTag::Subtraction,
            13 => ButtonTag::Multiplication,
            14 => ButtonTag::Division,
            15 => ButtonTag::Equality,
            16 => ButtonTag::ArithmeticClear,
            17 => ButtonTag::Clear,
            18 => ButtonTag::SignToggle,
            19 => ButtonTag::Percentage,
            20 => ButtonTag::OpeningParenthesis,
            21 => ButtonTag::ClosingParenthesis,
            22 => ButtonTag::MemoryClear,
            23 => ButtonTag::MemoryPlus,
            24 => ButtonTag::MemoryMinus,
            25 => ButtonTag::MemoryRead,
            26 => ButtonTag::SecondaryFunctionalToggle,
            27 => ButtonTag::XSquared,
            28 => ButtonTag::XCubed,
            29 => ButtonTag::XPowerY,
            30 => ButtonTag::EulerNumberPowerX,
            31 => ButtonTag::YPowerX,
            32 => ButtonTag::TenPowerX,
            33 => ButtonTag::TwoPowerX,
            34 => ButtonTag::OneOverX,
            35 => ButtonTag::SquareRootOfX,
            36 => ButtonTag::CubicRootOfX,
            37 => ButtonTag::YthRootOfX,
            38 => ButtonTag::NaturalLogarithm,
            39 => ButtonTag::LogarithmBaseYOfX,
            40 => ButtonTag::CommonLogarithm,
            41 => ButtonTag::LogarithmBaseTwo,
            42 => ButtonTag::XFactorial,
            43 => ButtonTag::Sin,
            44 => ButtonTag::Cos,
            45 => ButtonTag::Tan,
            46 => ButtonTag::ArcSin,
            47 => ButtonTag::ArcCos,
            48 => ButtonTag::ArcTan,
            49 => ButtonTag::Sinh,
            50 => ButtonTag::Cosh,
            51 => ButtonTag::Tanh,
            52 => ButtonTag::ArcSinh,
            53 => ButtonTag::ArcCosh,
            54 => ButtonTag::ArcTanh,
            55 => ButtonTag::Pi,
            56 => ButtonTag::EulerNumber,
            57 => ButtonTag::Rand,
            58 => ButtonTag::EE,
            59 => ButtonTag::Rad,
            60 => ButtonTag::Deg,
            _ => return Err(CalcError::UnrecognizedTag(tag)),
        };
        Ok(button)
    }
}

impl From<ButtonTag> for i64 {
    fn from(button: ButtonTag) -> i64 {
        button.tag()
    }
}

impl fmt::Display for ButtonTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(ButtonTag::all().len(), 61);
        for (i, button) in ButtonTag::all().iter().enumerate() {
            assert_eq!(button.tag(), i as i64);
            assert_eq!(ButtonTag::try_from(i as i64), Ok(*button));
        }
        assert_eq!(ButtonTag::try_from(61), Err(CalcError::UnrecognizedTag(61)));
        assert_eq!(ButtonTag::try_from(-1), Err(CalcError::UnrecognizedTag(-1)));
    }

    #[test]
    fn test_keys() {
        assert_eq!(ButtonTag::Zero.key(), Key::Digit(Digit(0)));
        assert_eq!(ButtonTag::Nine.key(), Key::Digit(Digit(9)));
        assert_eq!(ButtonTag::DecimalSeparator.key(), Key::DecimalSeparator);
        assert_eq!(ButtonTag::Addition.key(), Key::Operator(Operator::Add));
        assert_eq!(ButtonTag::Deg.key(), Key::Operator(Operator::Degree));
        let operators = ButtonTag::all()
            .iter()
            .filter(|b| matches!(b.key(), Key::Operator(..)))
            .count();
        assert_eq!(operators, 50);
    }

    #[test]
    fn test_digit() {
        assert_eq!(Digit::new(7).map(Digit::value), Some(7));
        assert_eq!(Digit::new(10), None);
    }
}
