use thiserror::Error;

use crate::session::states::{
    SessionAction, SessionEvent, SessionPhase, SessionState, TransitionOutcome,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionTransitionError {
    #[error("input is empty after trimming")]
    EmptyInput,
    #[error("a reply is already being generated")]
    GenerationInFlight,
    #[error("no reply is being generated; cannot apply `{event}`")]
    NotAwaitingResponse { event: &'static str },
    #[error("voice capture is already in progress")]
    AlreadyListening,
    #[error("no voice capture is in progress; cannot apply `{event}`")]
    NotListening { event: &'static str },
}

/// Pure transition function for one chat session.
///
/// Generation (`Idle`/`AwaitingResponse`) and voice capture (`is_listening`)
/// are tracked independently; a finished capture only feeds the same submit
/// path as typed input.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionMachine;

impl SessionMachine {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_state(&self, start_muted: bool) -> SessionState {
        SessionState::new(start_muted)
    }

    pub fn apply(
        &self,
        current: &SessionState,
        event: &SessionEvent,
    ) -> Result<TransitionOutcome, SessionTransitionError> {
        transition(current, event)
    }
}

fn transition(
    current: &SessionState,
    event: &SessionEvent,
) -> Result<TransitionOutcome, SessionTransitionError> {
    use SessionAction::{
        BeginCapture, GenerateReply, RecordBotTurn, RecordUserTurn, Speak, SubmitTranscript,
    };

    let mut next = current.clone();
    let actions = match event {
        SessionEvent::InputEdited { text } => {
            next.current_input_text = text.clone();
            Vec::new()
        }
        SessionEvent::Submitted { text } => {
            if text.trim().is_empty() {
                return Err(SessionTransitionError::EmptyInput);
            }
            if current.is_generating {
                return Err(SessionTransitionError::GenerationInFlight);
            }
            next.is_generating = true;
            vec![RecordUserTurn, GenerateReply]
        }
        SessionEvent::GenerationSucceeded | SessionEvent::GenerationFailed => {
            if !current.is_generating {
                return Err(SessionTransitionError::NotAwaitingResponse { event: event.name() });
            }
            next.is_generating = false;
            next.current_input_text.clear();
            // Mute is read at completion time, not at submission time.
            if current.is_muted {
                vec![RecordBotTurn]
            } else {
                vec![RecordBotTurn, Speak]
            }
        }
        SessionEvent::CaptureStarted => {
            if current.is_listening {
                return Err(SessionTransitionError::AlreadyListening);
            }
            next.is_listening = true;
            vec![BeginCapture]
        }
        SessionEvent::CaptureTranscribed { text } => {
            if !current.is_listening {
                return Err(SessionTransitionError::NotListening { event: event.name() });
            }
            next.is_listening = false;
            next.current_input_text = text.clone();
            vec![SubmitTranscript]
        }
        SessionEvent::CaptureFailed | SessionEvent::CaptureEnded => {
            next.is_listening = false;
            Vec::new()
        }
        SessionEvent::MuteToggled => {
            next.is_muted = !current.is_muted;
            Vec::new()
        }
    };

    Ok(TransitionOutcome {
        from: current.phase(),
        to: next.phase(),
        event: event.clone(),
        state: next,
        actions,
    })
}
