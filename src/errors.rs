use thiserror::Error;

use crate::button::ButtonTag;
use crate::operator::Operator;

/// Evaluation result: either a number or the reason it could not be computed
pub type CalcResult = Result<f64, CalcError>;
pub(crate) type CalcErrorResult = Result<(), CalcError>;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CalcError {
    #[error("Unrecognized button tag {0}")]
    UnrecognizedTag(i64),
    #[error("Button '{0}' is not an operator")]
    NotAnOperator(ButtonTag),
    #[error("Operator '{0}' is not a constant")]
    NotAConstant(Operator),
    #[error("Invalid operator '{0}'")]
    InvalidOp(Operator),

    #[error("'{0}' divided by zero")]
    DividedByZero(String),
    #[error("Invalid argument {1} for function '{0}'")]
    InvalidArgument(String, String),
    #[error("Function '{0}' is not supported for negative numbers")]
    NotForNegative(String),
    #[error("{0} supports only integers")]
    OnlyInt(String),
    #[error("Result of '{0}' is not a finite number")]
    NotFinite(String),

    #[error("Mismatched closing bracket")]
    ClosingBracketMismatch,
    #[error("Operator requires an operand")]
    MissingOperand,
    #[error("Too few operands")]
    InsufficientOps,

    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Inconsistent calculator state: {0}")]
    CorruptState(String),
}

impl CalcError {
    /// Returns true for numeric failures: the ones that turn the displayed
    /// result into "not a number". Structural errors (bad tags, unbalanced
    /// brackets, missing operands) leave the calculator state untouched.
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            CalcError::DividedByZero(..)
                | CalcError::InvalidArgument(..)
                | CalcError::NotForNegative(..)
                | CalcError::OnlyInt(..)
                | CalcError::NotFinite(..)
        )
    }
}
