use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::expression::Token;
use crate::functions::AngleMode;
use crate::operator::Operator;

/// Plain-data copy of a calculator brain. The caller picks the archive
/// format; the brain only guarantees that restoring a snapshot gives back
/// a brain that behaves the same way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrainState {
    pub memory: f64,
    pub angle_mode: AngleMode,
    /// `None` when the last calculation failed
    pub pending_result: Option<f64>,
    pub infix: Vec<Token>,
    /// bottom to top
    pub operands: Vec<f64>,
    /// bottom to top
    pub operators: Vec<Operator>,
}

impl BrainState {
    /// Rejects snapshots no sequence of key presses could produce. The log
    /// must agree with the stacks: every binary operator on the stack holds
    /// its left operand, and a log ending in `)` or in a function has the
    /// value of that group on top of the operand stack.
    pub fn validate(&self) -> CalcErrorResult {
        if !self.memory.is_finite() {
            return Err(CalcError::NotFinite("memory".to_string()));
        }
        if let Some(bad) = self
            .operators
            .iter()
            .find(|op| !op.is_binary() && !op.is_opening_parenthesis())
        {
            return Err(CalcError::InvalidOp(*bad));
        }
        let mut open = 0usize;
        for token in &self.infix {
            match token {
                Token::Operand(v) if !v.is_finite() => {
                    return Err(CalcError::NotFinite("operand".to_string()))
                }
                Token::Operand(..) => {}
                Token::Operator(op) if op.is_opening_parenthesis() => open += 1,
                Token::Operator(op) if op.is_closing_parenthesis() => {
                    open = open
                        .checked_sub(1)
                        .ok_or(CalcError::ClosingBracketMismatch)?;
                }
                Token::Operator(op) if op.is_binary() || op.is_unary() => {}
                Token::Operator(op) => return Err(CalcError::InvalidOp(*op)),
            }
        }
        let markers = self
            .operators
            .iter()
            .filter(|op| op.is_opening_parenthesis())
            .count();
        if markers != open {
            return Err(CalcError::CorruptState(format!(
                "{} open brackets in the expression, {} on the stack",
                open, markers
            )));
        }

        let binary = self.operators.len() - markers;
        let expected = match self.infix.last() {
            None if !self.operators.is_empty() => {
                return Err(CalcError::CorruptState("operators without expression".to_string()))
            }
            None => 0,
            Some(Token::Operand(..)) => binary,
            Some(Token::Operator(op)) if op.awaits_operand() => binary,
            // closing bracket or a function applied to a stacked value
            Some(Token::Operator(..)) => binary + 1,
        };
        if self.operands.len() != expected {
            return Err(CalcError::CorruptState(format!(
                "{} operands on the stack, expected {}",
                self.operands.len(),
                expected
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> BrainState {
        BrainState {
            memory: 2.0,
            angle_mode: AngleMode::Radian,
            pending_result: None,
            infix: vec![Token::Operand(1.0), Token::Operator(Operator::Add)],
            operands: vec![1.0],
            operators: vec![Operator::Add],
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(state().validate(), Ok(()));

        let mut s = state();
        s.operators.push(Operator::Sqrt);
        assert_eq!(s.validate(), Err(CalcError::InvalidOp(Operator::Sqrt)));

        let mut s = state();
        s.operands.push(3.0);
        s.operands.push(4.0);
        assert!(matches!(s.validate(), Err(CalcError::CorruptState(..))));
    }

    #[test]
    fn test_validate_log_against_stacks() {
        // "1 + 2" keeps the trailing operand out of the stack
        let mut s = state();
        s.infix.push(Token::Operand(2.0));
        assert_eq!(s.validate(), Ok(()));
        s.operands.push(2.0);
        assert!(matches!(s.validate(), Err(CalcError::CorruptState(..))));

        // "1 + ( 2 )" has the bracket value stacked
        let mut s = state();
        s.infix.extend([
            Token::Operator(Operator::OpenParenthesis),
            Token::Operand(2.0),
            Token::Operator(Operator::CloseParenthesis),
        ]);
        assert!(matches!(s.validate(), Err(CalcError::CorruptState(..))));
        s.operands.push(2.0);
        assert_eq!(s.validate(), Ok(()));

        // an open bracket in the log needs its marker on the stack
        let mut s = state();
        s.infix.push(Token::Operator(Operator::OpenParenthesis));
        assert!(matches!(s.validate(), Err(CalcError::CorruptState(..))));
        s.operators.push(Operator::OpenParenthesis);
        assert_eq!(s.validate(), Ok(()));

        let mut s = state();
        s.infix.push(Token::Operator(Operator::Equals));
        assert_eq!(s.validate(), Err(CalcError::InvalidOp(Operator::Equals)));

        let mut s = state();
        s.infix.clear();
        assert!(matches!(s.validate(), Err(CalcError::CorruptState(..))));
    }

    #[test]
    fn test_json() {
        let s = state();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"add\""));
        assert!(json.contains("\"radian\""));
        let back: BrainState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
