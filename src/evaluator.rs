use thiserror::Error;

use crate::token::{Operator, Token};

#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("Unknown token: `{0}`")]
    UnknownToken(String),

    #[error("Malformed expression")]
    MalformedExpression,

    #[error("Division by zero")]
    DivisionByZero,
}

pub fn evaluate(tokens: &[Token]) -> Result<f64, EvalError> {
    let (value, _) = evaluate_level(tokens, 0)?;
    Ok(value)
}

/// Evaluates one bracket-nesting level starting at `index`. Returns the
/// level's value together with the index just past its closing bracket;
/// a level that runs out of tokens is closed implicitly.
fn evaluate_level(tokens: &[Token], mut index: usize) -> Result<(f64, usize), EvalError> {
    let mut values: Vec<f64> = Vec::new();
    let mut ops: Vec<Operator> = Vec::new();

    while index < tokens.len() {
        match &tokens[index] {
            Token::Number(n) => {
                values.push(*n);
                index += 1;
            }
            Token::Operator(op) => {
                while let Some(top) = ops.last().copied() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    ops.pop();
                    apply(top, &mut values)?;
                }
                ops.push(*op);
                index += 1;
            }
            Token::OpenBracket => {
                let (value, next) = evaluate_level(tokens, index + 1)?;
                values.push(value);
                index = next;
            }
            Token::CloseBracket => break,
        }
    }

    while let Some(op) = ops.pop() {
        apply(op, &mut values)?;
    }

    let value = values
        .first()
        .copied()
        .ok_or(EvalError::MalformedExpression)?;

    Ok((value, index + 1))
}

fn apply(op: Operator, values: &mut Vec<f64>) -> Result<(), EvalError> {
    let right = values.pop().ok_or(EvalError::MalformedExpression)?;
    let left = values.pop().ok_or(EvalError::MalformedExpression)?;

    values.push(match op {
        Operator::Add => left + right,
        Operator::Subtract => left - right,
        Operator::Multiply => left * right,
        Operator::Divide => {
            if right == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            left / right
        }
    });

    Ok(())
}

#[cfg(test)]
mod test {
    use crate::{
        evaluator::{evaluate, EvalError},
        tokeniser::tokenise,
    };

    fn eval(expr: &str) -> Result<f64, EvalError> {
        evaluate(&tokenise(expr).unwrap())
    }

    #[test]
    fn precedence() {
        assert_eq!(Ok(14.0), eval("2+3*4"));
    }

    #[test]
    fn brackets_override_precedence() {
        assert_eq!(Ok(20.0), eval("(2+3)*4"));
    }

    #[test]
    fn left_associativity() {
        assert_eq!(Ok(2.0), eval("10/2-3"));
        assert_eq!(Ok(5.0), eval("10-3-2"));
        assert_eq!(Ok(1.25), eval("10/2/4"));
    }

    #[test]
    fn nested_brackets() {
        assert_eq!(eval("2"), eval("(((2)))"));
        assert_eq!(Ok(14.0), eval("2*((1+2)+4)"));
    }

    #[test]
    fn precedence_inside_brackets() {
        assert_eq!(Ok(28.0), eval("(2+3*4)*2"));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(Err(EvalError::DivisionByZero), eval("1/0"));
        assert_eq!(Err(EvalError::DivisionByZero), eval("1/(2-2)"));
    }

    #[test]
    fn doubled_operator() {
        assert_eq!(Err(EvalError::MalformedExpression), eval("2++3"));
    }

    #[test]
    fn leading_operator() {
        assert_eq!(Err(EvalError::MalformedExpression), eval("*2"));
    }

    #[test]
    fn unmatched_close_bracket() {
        assert_eq!(Err(EvalError::MalformedExpression), eval(")2"));
    }

    #[test]
    fn unmatched_open_bracket_closes_implicitly() {
        assert_eq!(Ok(5.0), eval("(2+3"));
        assert_eq!(Ok(20.0), eval("(2+3)*4"));
    }

    #[test]
    fn decimals() {
        assert_eq!(Ok(4.0), eval("2.5+1.5"));
    }
}
