use thiserror::Error;

use crate::Kind;

/// An error raised while a compiled program runs. These abort the program;
/// they are never compile-time diagnostics.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("cannot use NOOB as an operand of {operation}")]
    AbsentOperand { operation: &'static str },

    #[error("cannot use YARN {text:?} as an operand of {operation}: not a number")]
    NonNumericText {
        text: Box<str>,
        operation: &'static str,
    },

    #[error("cannot cast YARN {text:?} to {target}")]
    InvalidCast { text: Box<str>, target: Kind },

    #[error("failed to {action}: {message}")]
    Io {
        action: &'static str,
        message: Box<str>,
    },

    #[error("call depth exceeded the limit of {limit}")]
    CallDepthExceeded { limit: usize },
}

impl Error {
    pub(crate) fn io(action: &'static str, error: &std::io::Error) -> Error {
        Error::Io {
            action,
            message: error.to_string().into_boxed_str(),
        }
    }
}
