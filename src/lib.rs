
mod evaluator;
mod token;
mod tokeniser;

pub mod contacts;
pub mod finance;
pub mod notes;
pub mod storage;
pub mod tasks;

pub use evaluator::{evaluate, EvalError};
pub use token::{Operator, Token};
pub use tokeniser::{tokenise, TokeniseError};

use thiserror::Error;

/// Tokenises and evaluates an arithmetic expression in one step.
pub fn calculate(expr: &str) -> Result<f64, CalcError> {
    Ok(evaluator::evaluate(&tokeniser::tokenise(expr)?)?)
}

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error(transparent)]
    Tokenise(#[from] TokeniseError),

    #[error(transparent)]
    Evaluate(#[from] EvalError),
}
