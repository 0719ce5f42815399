use std::default::Default;

use thiserror::Error;

use crate::token::{Operator, Token};

#[derive(Debug, Error, PartialEq)]
pub enum TokeniseError {
    #[error("Invalid character in expression: `{0}`")]
    InvalidCharacter(char),

    #[error("Empty expression")]
    EmptyExpression,
}

enum ScanAction {
    Advance,
    Done,
    Hold,
}

trait State {
    fn handle(
        &mut self,
        c: Option<char>,
    ) -> Result<(Option<Token>, Option<Box<dyn State>>, ScanAction), TokeniseError>;
}

struct NormalState {}
impl State for NormalState {
    fn handle(
        &mut self,
        c: Option<char>,
    ) -> Result<(Option<Token>, Option<Box<dyn State>>, ScanAction), TokeniseError> {
        match c {
            Some(c) if c.is_ascii_digit() => Ok((
                None,
                Some(Box::new(NumberState {
                    ..Default::default()
                })),
                ScanAction::Hold,
            )),

            Some(c) if c.is_whitespace() => Ok((None, None, ScanAction::Advance)),

            Some('+') => Ok((
                Some(Token::Operator(Operator::Add)),
                None,
                ScanAction::Advance,
            )),
            Some('-') => Ok((
                Some(Token::Operator(Operator::Subtract)),
                None,
                ScanAction::Advance,
            )),
            Some('*') => Ok((
                Some(Token::Operator(Operator::Multiply)),
                None,
                ScanAction::Advance,
            )),
            Some('/') => Ok((
                Some(Token::Operator(Operator::Divide)),
                None,
                ScanAction::Advance,
            )),

            Some('(') => Ok((Some(Token::OpenBracket), None, ScanAction::Advance)),
            Some(')') => Ok((Some(Token::CloseBracket), None, ScanAction::Advance)),

            Some(c) => Err(TokeniseError::InvalidCharacter(c)),
            None => Ok((None, None, ScanAction::Done)),
        }
    }
}

#[derive(Default)]
struct NumberState {
    point: bool,
    string: String,
}

impl NumberState {
    // A literal ending in `.` has no digits after the point.
    fn finish(&self) -> Result<Token, TokeniseError> {
        if self.string.ends_with('.') {
            return Err(TokeniseError::InvalidCharacter('.'));
        }
        Ok(Token::Number(self.string.parse().unwrap()))
    }
}

impl State for NumberState {
    fn handle(
        &mut self,
        c: Option<char>,
    ) -> Result<(Option<Token>, Option<Box<dyn State>>, ScanAction), TokeniseError> {
        match c {
            Some(c) if c.is_ascii_digit() => {
                self.string.push(c);
                Ok((None, None, ScanAction::Advance))
            }
            Some('.') => {
                if self.point {
                    return Err(TokeniseError::InvalidCharacter('.'));
                }
                self.string.push('.');
                self.point = true;
                Ok((None, None, ScanAction::Advance))
            }
            None => Ok((Some(self.finish()?), None, ScanAction::Done)),
            _ => Ok((
                Some(self.finish()?),
                Some(Box::new(NormalState {})),
                ScanAction::Hold,
            )),
        }
    }
}

pub fn tokenise(input: &str) -> Result<Vec<Token>, TokeniseError> {
    let mut state: Box<dyn State> = Box::new(NormalState {});

    let mut i = 0;

    let mut tokens = Vec::new();

    loop {
        let (token, new_state, action) = state.handle(input.chars().nth(i))?;
        if let Some(new_state) = new_state {
            state = new_state;
        }
        if let Some(token) = token {
            tokens.push(token);
        }
        match action {
            ScanAction::Advance => i += 1,
            ScanAction::Done => break,
            ScanAction::Hold => {}
        }
    }

    if tokens.is_empty() {
        return Err(TokeniseError::EmptyExpression);
    }

    Ok(tokens)
}
