use thiserror::Error;

use crate::responses::ResponseLibrary;
use crate::session::SessionTransitionError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Session(#[from] SessionTransitionError),
    #[error("generation failure: {0}")]
    Generation(String),
    #[error("voice capture failure: {0}")]
    Capture(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("runtime failure: {0}")]
    Runtime(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Session(SessionTransitionError::EmptyInput) => "empty_input",
            Self::Session(SessionTransitionError::GenerationInFlight) => "generation_in_flight",
            Self::Session(_) => "invalid_transition",
            Self::Generation(_) => "generation_failure",
            Self::Capture(_) => "capture_failure",
            Self::Configuration(_) => "config_validation",
            Self::Runtime(_) => "runtime_init",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Session(_) => 1,
            Self::Configuration(_) => 2,
            Self::Runtime(_) => 3,
            Self::Generation(_) => 4,
            Self::Capture(_) => 5,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Session(SessionTransitionError::EmptyInput) => "Please type or say something.",
            Self::Session(_) => "Please wait for the current reply to finish.",
            Self::Generation(_) => ResponseLibrary::new().generation_error(),
            Self::Capture(_) => "Voice input did not produce any text. Please try again.",
            Self::Configuration(_) => "The assistant is not configured correctly.",
            Self::Runtime(_) => "An unexpected internal error occurred.",
        }
    }
}
