use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::*;
use crate::functions::{self, AngleMode};
use crate::operator::Operator;
use crate::stack::Stack;
use crate::value::format_f64;

/// An entry of the infix expression: what the user has typed so far
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    Operand(f64),
    Operator(Operator),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Operand(v) => write!(f, "{}", format_f64(*v)),
            Token::Operator(op) => write!(f, "{}", op.button()),
        }
    }
}

/// Brain settings an evaluation step depends on
#[derive(Clone, Copy, Debug)]
pub(crate) struct Context {
    pub angle_mode: AngleMode,
    pub factorial_limit: u32,
    /// result of the last completed calculation; the left operand when an
    /// operator arrives before any operand
    pub pending_result: f64,
}

// Where the value the next operator applies to lives
#[derive(Clone, Copy, Debug, PartialEq)]
enum Tail {
    Empty,
    // the last token of the infix expression
    Operand(f64),
    // top of the operand stack: after a closing bracket or a function
    // applied to it
    Stacked(f64),
    Awaiting,
}

/// The unresolved infix expression with its working stacks. Everything but
/// the trailing operand is already pushed to the stacks and reduced as far
/// as precedence allows.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Expression {
    pub(crate) infix: Vec<Token>,
    pub(crate) operands: Stack<f64>,
    pub(crate) operators: Stack<Operator>,
}

impl Expression {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    pub(crate) fn reset(&mut self) {
        self.infix.clear();
        self.operands.clear();
        self.operators.clear();
    }

    fn tail(&self, pending_result: f64) -> Tail {
        match self.infix.last() {
            None if pending_result.is_finite() => Tail::Empty,
            None => Tail::Awaiting,
            Some(Token::Operand(v)) => Tail::Operand(*v),
            Some(Token::Operator(op)) if op.awaits_operand() => Tail::Awaiting,
            // a failed reduction may have consumed the stacked value
            Some(Token::Operator(..)) => self.operands.peek().map_or(Tail::Awaiting, |v| Tail::Stacked(*v)),
        }
    }

    pub(crate) fn is_waiting_for_operand(&self) -> bool {
        matches!(self.infix.last(), Some(Token::Operator(op)) if op.awaits_operand())
    }

    /// The number a calculator display would show at this point
    pub(crate) fn current_value(&self, pending_result: f64) -> f64 {
        match self.tail(pending_result) {
            Tail::Operand(v) | Tail::Stacked(v) => v,
            Tail::Empty => pending_result,
            Tail::Awaiting => self.operands.peek().copied().unwrap_or(pending_result),
        }
    }

    /// Appends an operand. An operand right after another one replaces it:
    /// the caller re-sends the number being typed after every keystroke.
    /// A number typed after a closing bracket, or after a function applied
    /// to one, replaces the whole bracket group.
    pub(crate) fn push_operand(&mut self, value: f64) {
        if let Some(Token::Operand(last)) = self.infix.last_mut() {
            trace!("replace operand {} with {}", format_f64(*last), format_f64(value));
            *last = value;
            return;
        }
        if let Some(start) = self.stacked_group_start() {
            if let Some(dropped) = self.operands.pop() {
                trace!("replace bracket value {} with {}", format_f64(dropped), format_f64(value));
                self.infix.truncate(start);
            }
        }
        trace!("push operand {}", format_f64(value));
        self.infix.push(Token::Operand(value));
    }

    // Index of the opening bracket whose group, with the functions applied
    // to it, produced the value on top of the operand stack
    fn stacked_group_start(&self) -> Option<usize> {
        let mut idx = self.infix.len();
        while idx > 0 && matches!(self.infix[idx - 1], Token::Operator(op) if op.is_unary()) {
            idx -= 1;
        }
        if idx == 0 || self.infix[idx - 1] != Token::Operator(Operator::CloseParenthesis) {
            return None;
        }
        let mut depth = 0usize;
        while idx > 0 {
            idx -= 1;
            match self.infix[idx] {
                Token::Operator(Operator::CloseParenthesis) => depth += 1,
                Token::Operator(Operator::OpenParenthesis) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Replaces the operand being typed with zero
    pub(crate) fn clear_entry(&mut self) -> bool {
        match self.infix.last_mut() {
            Some(Token::Operand(last)) => {
                *last = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Applies an operator that changes the expression. A failed operator
    /// leaves the expression as it was before the key.
    pub(crate) fn apply(&mut self, op: Operator, ctx: &Context) -> CalcResult {
        let mut next = self.clone();
        let res = next.dispatch(op, ctx)?;
        *self = next;
        Ok(res)
    }

    fn dispatch(&mut self, op: Operator, ctx: &Context) -> CalcResult {
        if op.is_unary() {
            self.unary(op, ctx)
        } else if op.is_binary() {
            self.binary(op, ctx)
        } else if op.is_opening_parenthesis() {
            self.open_bracket(ctx)
        } else if op.is_closing_parenthesis() {
            self.close_bracket(ctx)
        } else if op == Operator::Equals {
            self.equals(ctx)
        } else {
            Err(CalcError::InvalidOp(op))
        }
    }

    // Functions are postfix: they replace the current value with the result
    fn unary(&mut self, op: Operator, ctx: &Context) -> CalcResult {
        let tail = self.tail(ctx.pending_result);
        let x = match tail {
            Tail::Operand(v) | Tail::Stacked(v) => v,
            Tail::Empty => ctx.pending_result,
            Tail::Awaiting => return Err(CalcError::MissingOperand),
        };
        let res = functions::unary(op, x, ctx.angle_mode, ctx.factorial_limit)?;
        if op.uses_angle() {
            debug!("{}({} {}) = {}", op, format_f64(x), ctx.angle_mode, format_f64(res));
        } else {
            debug!("{}({}) = {}", op, format_f64(x), format_f64(res));
        }
        match tail {
            Tail::Operand(..) => {
                self.infix.pop();
                self.infix.push(Token::Operand(res));
            }
            Tail::Stacked(..) => {
                self.operands.pop();
                self.operands.push(res);
                self.infix.push(Token::Operator(op));
            }
            _ => self.infix.push(Token::Operand(res)),
        }
        Ok(res)
    }

    fn binary(&mut self, op: Operator, ctx: &Context) -> CalcResult {
        match self.tail(ctx.pending_result) {
            Tail::Operand(v) => self.operands.push(v),
            Tail::Stacked(..) => {}
            Tail::Empty => {
                let v = ctx.pending_result;
                self.infix.push(Token::Operand(v));
                self.operands.push(v);
            }
            Tail::Awaiting => match self.infix.last() {
                // a second operator in a row replaces the first one
                Some(&Token::Operator(prev)) if prev.is_binary() => {
                    trace!("replace operator {} with {}", prev, op);
                    self.infix.pop();
                    self.operators.pop();
                }
                _ => return Err(CalcError::MissingOperand),
            },
        }

        self.pop_while_priority(op)?;
        self.operators.push(op);
        self.infix.push(Token::Operator(op));
        self.operands.peek().copied().ok_or(CalcError::InsufficientOps)
    }

    fn open_bracket(&mut self, ctx: &Context) -> CalcResult {
        match self.tail(ctx.pending_result) {
            // "2 (" means "2 × ("
            Tail::Operand(..) | Tail::Stacked(..) => {
                self.binary(Operator::Multiply, ctx)?;
            }
            Tail::Empty | Tail::Awaiting => {}
        }
        self.operators.push(Operator::OpenParenthesis);
        self.infix.push(Token::Operator(Operator::OpenParenthesis));
        Ok(self.current_value(ctx.pending_result))
    }

    fn close_bracket(&mut self, ctx: &Context) -> CalcResult {
        if !self.operators.iter().any(|op| op.is_opening_parenthesis()) {
            return Err(CalcError::ClosingBracketMismatch);
        }
        match self.tail(ctx.pending_result) {
            Tail::Operand(v) => self.operands.push(v),
            Tail::Stacked(..) => {}
            Tail::Empty | Tail::Awaiting => return Err(CalcError::MissingOperand),
        }

        self.pop_until_bracket()?;
        self.infix.push(Token::Operator(Operator::CloseParenthesis));
        self.operands.peek().copied().ok_or(CalcError::InsufficientOps)
    }

    fn equals(&mut self, ctx: &Context) -> CalcResult {
        // operators still waiting for their right operand are dropped:
        // "3 + =" is 3
        let mut dropped = false;
        while let Some(&Token::Operator(op)) = self.infix.last() {
            if !op.awaits_operand() {
                break;
            }
            trace!("drop dangling {}", op);
            self.infix.pop();
            self.operators.pop();
            dropped = true;
        }

        if self.infix.is_empty() {
            return if ctx.pending_result.is_finite() {
                Ok(ctx.pending_result)
            } else {
                Err(CalcError::MissingOperand)
            };
        }
        // the operand before a dropped operator is on the stack already
        if !dropped {
            match self.tail(ctx.pending_result) {
                Tail::Operand(v) => self.operands.push(v),
                Tail::Stacked(..) => {}
                Tail::Empty | Tail::Awaiting => return Err(CalcError::MissingOperand),
            }
        }

        self.pop_all()?;
        let res = self.operands.pop().ok_or(CalcError::InsufficientOps)?;
        if !self.operands.is_empty() {
            return Err(CalcError::InsufficientOps);
        }
        debug!("result {}", format_f64(res));
        Ok(res)
    }

    // pops the top operator with its two operands and pushes the result
    fn reduce_top(&mut self) -> CalcErrorResult {
        let op = self.operators.pop().ok_or(CalcError::InsufficientOps)?;
        let rhs = self.operands.pop().ok_or(CalcError::InsufficientOps)?;
        let lhs = self.operands.pop().ok_or(CalcError::InsufficientOps)?;
        let res = functions::binary(op, lhs, rhs)?;
        debug!("reduce {} {} {} = {}", format_f64(lhs), op.button(), format_f64(rhs), format_f64(res));
        self.operands.push(res);
        Ok(())
    }

    // reduce operators while the top operator in the stack has equal or
    // greater priority than the incoming one
    fn pop_while_priority(&mut self, incoming: Operator) -> CalcErrorResult {
        while let Some(top) = self.operators.peek().copied() {
            match top.compare_precedence(&incoming) {
                Some(Ordering::Greater) | Some(Ordering::Equal) => self.reduce_top()?,
                // lower priority or an opening bracket
                _ => return Ok(()),
            }
        }
        Ok(())
    }

    // reduce operators until the first opening bracket and remove it
    fn pop_until_bracket(&mut self) -> CalcErrorResult {
        loop {
            match self.operators.peek().copied() {
                None => return Err(CalcError::ClosingBracketMismatch),
                Some(op) if op.is_opening_parenthesis() => {
                    self.operators.pop();
                    return Ok(());
                }
                Some(..) => self.reduce_top()?,
            }
        }
    }

    // reduce everything regardless of priority. Brackets that were never
    // closed are ignored
    fn pop_all(&mut self) -> CalcErrorResult {
        while let Some(op) = self.operators.peek().copied() {
            if op.is_opening_parenthesis() {
                self.operators.pop();
            } else {
                self.reduce_top()?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tokens: Vec<String> = self.infix.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", tokens.join(" "))
    }
}
