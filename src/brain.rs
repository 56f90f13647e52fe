use std::f64::consts;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::config::BrainConfig;
use crate::errors::*;
use crate::expression::{Context, Expression, Token};
use crate::functions::AngleMode;
use crate::operator::Operator;
use crate::random::{random_source, RandomSource};
use crate::stack::Stack;
use crate::state::BrainState;
use crate::value::{self, ensure_finite, format_f64};

/// Evaluation engine of a button-driven calculator.
///
/// The brain is fed one event at a time: the number being typed with
/// [`push_operand`](Self::push_operand) and key presses with
/// [`perform_operator`](Self::perform_operator). Every call returns the
/// number the display should show next. Binary operators are resolved with
/// the usual precedence as soon as the input allows:
///
/// ```
/// use calcbrain::{CalculatorBrain, Operator};
///
/// let mut brain = CalculatorBrain::new();
/// brain.push_operand(2.0);
/// brain.perform_operator(Operator::Add).unwrap();
/// brain.push_operand(3.0);
/// brain.perform_operator(Operator::Multiply).unwrap();
/// brain.push_operand(4.0);
/// assert_eq!(brain.perform_operator(Operator::Equals), Ok(14.0));
/// ```
#[derive(Debug)]
pub struct CalculatorBrain {
    memory: f64,
    angle_mode: AngleMode,
    expression: Expression,
    pending_result: f64,
    factorial_limit: u32,
    random: Box<dyn RandomSource>,
    // a random number drawn by a preview and not yet handed out
    peeked_random: Option<f64>,
}

impl Default for CalculatorBrain {
    fn default() -> Self {
        CalculatorBrain::new()
    }
}

impl CalculatorBrain {
    pub fn new() -> Self {
        CalculatorBrain::build(&BrainConfig::default())
    }

    pub fn with_config(config: BrainConfig) -> Result<Self, CalcError> {
        config.validate()?;
        Ok(CalculatorBrain::build(&config))
    }

    /// Replaces the generator behind the `Rand` key
    pub fn with_random_source(mut self, source: Box<dyn RandomSource>) -> Self {
        self.random = source;
        self.peeked_random = None;
        self
    }

    fn build(config: &BrainConfig) -> Self {
        CalculatorBrain {
            memory: 0.0,
            angle_mode: config.angle_mode,
            expression: Expression::new(),
            pending_result: 0.0,
            factorial_limit: config.factorial_limit,
            random: random_source(config.random_seed),
            peeked_random: None,
        }
    }

    /// Restores a brain saved with [`state`](Self::state)
    pub fn from_state(state: BrainState, config: BrainConfig) -> Result<Self, CalcError> {
        config.validate()?;
        state.validate()?;
        let mut brain = CalculatorBrain::build(&config);
        brain.memory = state.memory;
        brain.angle_mode = state.angle_mode;
        brain.pending_result = state.pending_result.unwrap_or(f64::NAN);
        brain.expression = Expression {
            infix: state.infix,
            operands: Stack::from(state.operands),
            operators: Stack::from(state.operators),
        };
        debug!("restored brain: {}", brain.expression);
        Ok(brain)
    }

    pub fn state(&self) -> BrainState {
        BrainState {
            memory: self.memory,
            angle_mode: self.angle_mode,
            pending_result: Some(self.pending_result).filter(|v| v.is_finite()),
            infix: self.expression.infix.clone(),
            operands: self.expression.operands.iter().copied().collect(),
            operators: self.expression.operators.iter().copied().collect(),
        }
    }

    fn context(&self) -> Context {
        Context {
            angle_mode: self.angle_mode,
            factorial_limit: self.factorial_limit,
            pending_result: self.pending_result,
        }
    }

    /// Sets the number being typed. Calling it again before an operator
    /// replaces the previous value instead of adding a new operand.
    pub fn push_operand(&mut self, value: f64) {
        self.expression.push_operand(value);
    }

    pub fn perform_operator(&mut self, op: Operator) -> CalcResult {
        self.perform_operator_with_mode(op, false)
    }

    /// Applies an operator. With `experimental` set the operator is
    /// evaluated on a copy of the expression: the result is what the key
    /// would produce, but the brain itself does not change. UIs use it to
    /// preview the result of `=` while the user is still typing.
    pub fn perform_operator_with_mode(&mut self, op: Operator, experimental: bool) -> CalcResult {
        trace!("perform {} (experimental: {})", op, experimental);
        if op.is_constant() {
            return self.constant(op, experimental);
        }
        if op.is_command() {
            return if experimental {
                Ok(self.current_value())
            } else {
                self.perform_command(op)
            };
        }

        let ctx = self.context();
        if experimental {
            let mut preview = self.expression.clone();
            return preview.apply(op, &ctx);
        }

        let res = self.expression.apply(op, &ctx);
        match res {
            Ok(v) => {
                self.pending_result = v;
                if op == Operator::Equals {
                    debug!("{} = {}", self.expression, format_f64(v));
                    self.expression.reset();
                }
            }
            Err(ref e) if e.is_domain_error() => {
                warn!("{}: {}", self.expression, e);
                self.pending_result = f64::NAN;
                // a failed "=" still ends the calculation: the next number
                // starts a new expression
                if op == Operator::Equals {
                    self.expression.reset();
                }
            }
            Err(ref e) => debug!("{} rejected: {}", op, e),
        }
        res
    }

    fn perform_command(&mut self, op: Operator) -> CalcResult {
        match op {
            Operator::MemoryClear => self.clear_memory(),
            Operator::MemoryPlus => {
                let v = ensure_finite("m+", self.current_value())?;
                self.add_to_memory(v);
            }
            Operator::MemoryMinus => {
                let v = ensure_finite("m-", self.current_value())?;
                self.subtract_from_memory(v);
            }
            Operator::ArithmeticClear => self.clear_arithmetic(),
            Operator::Clear => {
                if !self.expression.clear_entry() && self.expression.infix.is_empty() {
                    self.pending_result = 0.0;
                }
            }
            Operator::Radian => self.set_angle_mode(AngleMode::Radian),
            Operator::Degree => self.set_angle_mode(AngleMode::Degree),
            Operator::SecondaryToggle => {}
            _ => return Err(CalcError::InvalidOp(op)),
        }
        Ok(self.current_value())
    }

    fn constant(&mut self, op: Operator, experimental: bool) -> CalcResult {
        match op {
            Operator::Pi => Ok(consts::PI),
            Operator::E => Ok(consts::E),
            // a preview keeps its draw for the next real press so that the
            // sequence of committed random numbers does not depend on it
            Operator::Rand if experimental => {
                let random = &mut self.random;
                Ok(*self.peeked_random.get_or_insert_with(|| random.next_unit()))
            }
            Operator::Rand => Ok(self.peeked_random.take().unwrap_or_else(|| self.random.next_unit())),
            Operator::MemoryRead => Ok(self.memory),
            _ => Err(CalcError::NotAConstant(op)),
        }
    }

    /// Returns the value of a constant key: pi, e, a random number in
    /// `[0, 1)`, or the memory contents for memory recall
    pub fn constant_number(&mut self, op: Operator) -> CalcResult {
        self.constant(op, false)
    }

    pub fn add_to_memory(&mut self, value: f64) {
        self.memory += value;
        debug!("memory {}", format_f64(self.memory));
    }

    pub fn subtract_from_memory(&mut self, value: f64) {
        self.memory -= value;
        debug!("memory {}", format_f64(self.memory));
    }

    pub fn clear_memory(&mut self) {
        self.memory = 0.0;
        debug!("memory cleared");
    }

    /// Forgets the expression and the last result. Memory and the angle
    /// mode survive.
    pub fn clear_arithmetic(&mut self) {
        self.expression.reset();
        self.pending_result = 0.0;
        debug!("arithmetic cleared");
    }

    pub fn toggle_radian_mode(&mut self) {
        self.set_angle_mode(self.angle_mode.toggled());
    }

    pub fn set_angle_mode(&mut self, mode: AngleMode) {
        self.angle_mode = mode;
        debug!("angle mode {}", mode);
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn is_radian_mode(&self) -> bool {
        self.angle_mode == AngleMode::Radian
    }

    /// True when the last key was a binary operator or an opening bracket,
    /// so the next key should start a new number
    pub fn is_waiting_for_operand_in_infix_expression(&self) -> bool {
        self.expression.is_waiting_for_operand()
    }

    pub fn is_integer(value: f64) -> bool {
        value::is_integer(value)
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    /// Result of the last calculation, NaN if it failed
    pub fn pending_result(&self) -> f64 {
        self.pending_result
    }

    pub fn infix_expression(&self) -> &[Token] {
        &self.expression.infix
    }

    /// The number a display would show now: the operand being typed, the
    /// value of the last closed bracket or function, or the last result
    pub fn current_value(&self) -> f64 {
        self.expression.current_value(self.pending_result)
    }
}

impl fmt::Display for CalculatorBrain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[derive(Debug)]
    struct FixedRandom(Vec<f64>);

    impl RandomSource for FixedRandom {
        fn next_unit(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    // feeds space separated keys: numbers are operands, the rest are
    // arithmetic symbols or operator names
    fn run(brain: &mut CalculatorBrain, keys: &str) -> CalcResult {
        let mut res = Ok(brain.current_value());
        for key in keys.split_whitespace() {
            if let Ok(v) = key.parse::<f64>() {
                brain.push_operand(v);
                res = Ok(v);
                continue;
            }
            let op = match key {
                "+" => Operator::Add,
                "-" => Operator::Subtract,
                "*" => Operator::Multiply,
                "/" => Operator::Divide,
                "=" => Operator::Equals,
                name => Operator::from_str(name).unwrap(),
            };
            res = brain.perform_operator(op);
        }
        res
    }

    fn assert_close(v: CalcResult, expected: f64) {
        match v {
            Ok(f) => assert!((f - expected).abs() < 1e-9, "{} != {}", f, expected),
            Err(e) => panic!("{:?}", e),
        }
    }

    #[test]
    fn test_precedence() {
        init_test_logging();
        let mut brain = CalculatorBrain::new();
        assert_eq!(run(&mut brain, "3 - 4 + 5 ="), Ok(4.0));
        assert_eq!(run(&mut brain, "2 + 3 * 4 ="), Ok(14.0));
        assert_eq!(run(&mut brain, "2 * ( 3 + 4 ) ="), Ok(14.0));
        assert_eq!(run(&mut brain, "2 pow 3 pow 2 ="), Ok(64.0));
        assert_eq!(run(&mut brain, "8 / 4 / 2 ="), Ok(1.0));
        assert_eq!(brain.pending_result(), 1.0);
        assert!(brain.infix_expression().is_empty());
    }

    #[test]
    fn test_running_result() {
        let mut brain = CalculatorBrain::new();
        assert_eq!(run(&mut brain, "2 +"), Ok(2.0));
        assert_eq!(run(&mut brain, "3 *"), Ok(3.0));
        assert_eq!(run(&mut brain, "4 -"), Ok(14.0));
        assert_eq!(brain.to_string(), "2 + 3 × 4 −");
    }

    #[test]
    fn test_division_by_zero() {
        init_test_logging();
        let mut brain = CalculatorBrain::new();
        let res = run(&mut brain, "5 / 0 =");
        assert_eq!(res, Err(CalcError::DividedByZero("5".to_string())));
        assert!(brain.pending_result().is_nan());

        assert!(brain.infix_expression().is_empty());
        assert_eq!(brain.state().pending_result, None);

        assert_eq!(run(&mut brain, "3 + 4"), Ok(4.0));
        assert_eq!(brain.to_string(), "3 + 4");
        assert_eq!(brain.perform_operator_with_mode(Operator::Equals, true), Ok(7.0));
        assert_eq!(run(&mut brain, "="), Ok(7.0));
        assert_eq!(brain.pending_result(), 7.0);
    }

    #[test]
    fn test_failed_operator_keeps_expression() {
        let mut brain = CalculatorBrain::new();
        let res = run(&mut brain, "1 + 5 / 0 *");
        assert!(res.unwrap_err().is_domain_error());
        assert!(brain.pending_result().is_nan());
        assert_eq!(brain.to_string(), "1 + 5 ÷ 0");
        assert_eq!(run(&mut brain, "2 ="), Ok(3.5));
    }

    #[test]
    fn test_operand_after_bracket() {
        let mut brain = CalculatorBrain::new();
        assert_eq!(run(&mut brain, "( 4 ) 5 + 1 ="), Ok(6.0));
        assert_eq!(run(&mut brain, "2 + ( 9 ) sqrt 7 ="), Ok(9.0));
        run(&mut brain, "( 2 + 2 ) 8").unwrap();
        assert_eq!(brain.infix_expression(), &[Token::Operand(8.0)]);
        assert_eq!(run(&mut brain, "="), Ok(8.0));
    }

    #[test]
    fn test_domain_error_keeps_operand() {
        let mut brain = CalculatorBrain::new();
        brain.push_operand(-4.0);
        assert!(brain.perform_operator(Operator::Sqrt).is_err());
        assert!(brain.pending_result().is_nan());
        assert_eq!(brain.infix_expression(), &[Token::Operand(-4.0)]);
        assert_eq!(run(&mut brain, "neg sqrt"), Ok(2.0));
    }

    #[test]
    fn test_structural_errors() {
        let mut brain = CalculatorBrain::new();
        brain.push_operand(3.0);
        assert_eq!(
            brain.perform_operator(Operator::CloseParenthesis),
            Err(CalcError::ClosingBracketMismatch)
        );
        assert_eq!(brain.pending_result(), 0.0);
        assert_eq!(brain.infix_expression(), &[Token::Operand(3.0)]);
        assert_eq!(run(&mut brain, "( sqrt"), Err(CalcError::MissingOperand));
    }

    #[test]
    fn test_memory() {
        let mut brain = CalculatorBrain::new();
        brain.clear_memory();
        brain.add_to_memory(5.0);
        brain.subtract_from_memory(2.0);
        assert_eq!(brain.memory(), 3.0);

        brain.push_operand(4.0);
        assert_eq!(brain.perform_operator(Operator::MemoryPlus), Ok(4.0));
        assert_eq!(brain.memory(), 7.0);
        brain.clear_arithmetic();
        assert_eq!(brain.memory(), 7.0);
        assert_eq!(brain.constant_number(Operator::MemoryRead), Ok(7.0));
        assert_eq!(run(&mut brain, "5 m- mc"), Ok(5.0));
        assert_eq!(brain.memory(), 0.0);
    }

    #[test]
    fn test_experimental() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, "3 + 4 *").unwrap();
        let before = brain.state();
        assert_eq!(brain.perform_operator_with_mode(Operator::Equals, true), Ok(7.0));
        assert_eq!(brain.perform_operator_with_mode(Operator::Equals, true), Ok(7.0));
        assert_eq!(brain.perform_operator_with_mode(Operator::Divide, true), Ok(4.0));
        assert_eq!(brain.perform_operator_with_mode(Operator::ArithmeticClear, true), Ok(4.0));
        assert_eq!(brain.state(), before);
        assert!(brain.is_waiting_for_operand_in_infix_expression());
        assert_eq!(run(&mut brain, "2 ="), Ok(11.0));
    }

    #[test]
    fn test_experimental_errors_do_not_stick() {
        let mut brain = CalculatorBrain::new();
        run(&mut brain, "1 / 0").unwrap();
        assert!(brain.perform_operator_with_mode(Operator::Equals, true).is_err());
        assert_eq!(brain.pending_result(), 1.0);
        assert_eq!(run(&mut brain, "2 ="), Ok(0.5));
    }

    #[test]
    fn test_angle_mode() {
        let mut brain = CalculatorBrain::new();
        assert!(!brain.is_radian_mode());
        brain.toggle_radian_mode();
        assert!(brain.is_radian_mode());
        brain.toggle_radian_mode();
        assert_eq!(brain.angle_mode(), AngleMode::Degree);

        brain.push_operand(90.0);
        assert_close(brain.perform_operator(Operator::Sin), 1.0);
        run(&mut brain, "ac rad").unwrap();
        brain.push_operand(consts::FRAC_PI_2);
        assert_close(brain.perform_operator(Operator::Sin), 1.0);
    }

    #[test]
    fn test_is_integer() {
        assert!(CalculatorBrain::is_integer(4.0));
        assert!(!CalculatorBrain::is_integer(4.5));
        assert!(!CalculatorBrain::is_integer(f64::NAN));
    }

    #[test]
    fn test_editing() {
        let mut brain = CalculatorBrain::new();
        brain.push_operand(1.0);
        brain.push_operand(12.0);
        assert_eq!(run(&mut brain, "+ - 2 ="), Ok(10.0));
        // chaining after "="
        assert_eq!(run(&mut brain, "* 3 ="), Ok(30.0));
        assert_eq!(run(&mut brain, "sqr"), Ok(900.0));
        assert_eq!(brain.infix_expression(), &[Token::Operand(900.0)]);
        assert_eq!(run(&mut brain, "c"), Ok(0.0));
        assert_eq!(run(&mut brain, "5 + 2 ( 1 + 2 ) ="), Ok(11.0));
    }

    #[test]
    fn test_waiting_for_operand() {
        let mut brain = CalculatorBrain::new();
        assert!(!brain.is_waiting_for_operand_in_infix_expression());
        run(&mut brain, "2 +").unwrap();
        assert!(brain.is_waiting_for_operand_in_infix_expression());
        run(&mut brain, "(").unwrap();
        assert!(brain.is_waiting_for_operand_in_infix_expression());
        brain.push_operand(1.0);
        assert!(!brain.is_waiting_for_operand_in_infix_expression());
        run(&mut brain, ")").unwrap();
        assert!(!brain.is_waiting_for_operand_in_infix_expression());
    }

    #[test]
    fn test_constants() {
        let mut brain =
            CalculatorBrain::new().with_random_source(Box::new(FixedRandom(vec![0.25, 0.5])));
        assert_eq!(brain.constant_number(Operator::Pi), Ok(consts::PI));
        assert_eq!(brain.perform_operator(Operator::E), Ok(consts::E));
        assert_eq!(brain.perform_operator_with_mode(Operator::Rand, true), Ok(0.25));
        assert_eq!(brain.constant_number(Operator::Rand), Ok(0.25));
        assert_eq!(brain.constant_number(Operator::Rand), Ok(0.5));
        assert_eq!(
            brain.constant_number(Operator::Add),
            Err(CalcError::NotAConstant(Operator::Add))
        );
        assert!(brain.infix_expression().is_empty());
    }

    #[test]
    fn test_seeded_random() {
        let config = BrainConfig {
            random_seed: Some(11),
            ..Default::default()
        };
        let mut a = CalculatorBrain::with_config(config.clone()).unwrap();
        let mut b = CalculatorBrain::with_config(config).unwrap();
        for _ in 0..3 {
            assert_eq!(a.constant_number(Operator::Rand), b.constant_number(Operator::Rand));
        }
    }

    #[test]
    fn test_config() {
        let config = BrainConfig::from_toml("angle_mode = \"radian\"\nfactorial_limit = 5").unwrap();
        let mut brain = CalculatorBrain::with_config(config).unwrap();
        assert!(brain.is_radian_mode());
        assert_eq!(run(&mut brain, "5 fact"), Ok(120.0));
        assert_eq!(
            run(&mut brain, "ac 6 fact"),
            Err(CalcError::NotFinite("factorial".to_string()))
        );
    }

    #[test]
    fn test_state() {
        let mut brain = CalculatorBrain::new();
        brain.add_to_memory(2.0);
        run(&mut brain, "2 * ( 3 + 4 ) -").unwrap();
        let json = serde_json::to_string(&brain.state()).unwrap();

        let state: BrainState = serde_json::from_str(&json).unwrap();
        let mut restored = CalculatorBrain::from_state(state, BrainConfig::default()).unwrap();
        assert_eq!(restored.state(), brain.state());
        assert_eq!(restored.memory(), 2.0);
        assert_eq!(run(&mut restored, "1 ="), Ok(13.0));

        run(&mut brain, "ac 1 / 0 =").unwrap_err();
        assert_eq!(brain.state().pending_result, None);
    }
}
