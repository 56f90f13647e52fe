//! # Calculator brain
//!
//! Evaluation engine of a button-driven scientific calculator. The crate does
//! not parse text: a user interface feeds it the number being typed and the
//! keys being pressed, one event at a time, and shows the number the brain
//! returns after every event.
//!
//! Binary operators are resolved with a streaming shunting-yard algorithm: an
//! operator is applied as soon as a later operator of the same or lower
//! priority arrives, so `2 + 3 × 4 −` already displays `14`. Priorities
//! (starting from highest):
//! * `xʸ`, `yˣ`, `ʸ√x`, `log_y x`, `EE`, `×`, `÷`
//! * `+`, `−`
//!
//! Operators of the same priority are applied from left to right. Brackets
//! group as usual; brackets left open are closed by `=`. A number followed by
//! `(` is multiplied by the bracket contents.
//!
//! Functions are postfix: `sin`, `√x`, `x!` and the rest apply to the number
//! on display immediately. The list of supported functions:
//! * powers: x², x³, eˣ, 10ˣ, 2ˣ, 1/x, √x, ∛x
//! * logarithms: ln, log₁₀, log₂
//! * trigonometric functions (including inverted ones): sin, cos, tan, asin, acos, atan
//! * hyperbolic functions (including inverted ones): sinh, cosh, tanh, asinh, acosh, atanh
//! * sign toggle, percentage, factorial
//!
//! Trigonometric functions take and return degrees or radians depending on
//! the angle mode of the brain (degrees by default).
//!
//! Numbers are `f64`. A calculation that has no finite result (division by
//! zero, logarithm of a negative number, and so on) returns an error and the
//! brain remembers NaN as its last result until the next calculation.
//!
//! Any key can be previewed: in experimental mode the brain evaluates a key on
//! a copy of its expression and tells what the display would show, without
//! changing anything.
//!
//! ```
//! use calcbrain::{CalculatorBrain, Operator};
//!
//! let mut brain = CalculatorBrain::new();
//! brain.push_operand(2.0);
//! brain.perform_operator(Operator::Multiply).unwrap();
//! brain.perform_operator(Operator::OpenParenthesis).unwrap();
//! brain.push_operand(3.0);
//! brain.perform_operator(Operator::Add).unwrap();
//! brain.push_operand(4.0);
//! assert_eq!(brain.perform_operator_with_mode(Operator::Equals, true), Ok(14.0));
//! assert!(!brain.is_waiting_for_operand_in_infix_expression());
//! ```

pub mod brain;
pub mod button;
pub mod config;
pub mod errors;
pub mod expression;
pub mod functions;
pub mod operator;
pub mod random;
pub mod stack;
pub mod state;
pub mod value;

pub use brain::CalculatorBrain;
pub use button::{ButtonTag, Digit, Key};
pub use config::BrainConfig;
pub use errors::{CalcError, CalcResult};
pub use expression::Token;
pub use functions::AngleMode;
pub use operator::{Arity, Operator, Precedence};
pub use random::RandomSource;
pub use stack::Stack;
pub use state::BrainState;

#[cfg(test)]
pub(crate) mod test_utils {
    /// Sends `tracing` output of a test to the test harness.
    ///
    /// Set `RUST_LOG=calcbrain=trace` to see every key press.
    pub fn init_test_logging() {
        use tracing_subscriber::{fmt, EnvFilter};

        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}
