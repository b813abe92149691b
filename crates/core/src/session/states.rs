use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    AwaitingResponse,
}

/// Everything the display surface needs to render a session besides the
/// transcript itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_input_text: String,
    pub is_generating: bool,
    pub is_listening: bool,
    pub is_muted: bool,
}

impl SessionState {
    pub fn new(start_muted: bool) -> Self {
        Self { is_muted: start_muted, ..Self::default() }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_generating {
            SessionPhase::AwaitingResponse
        } else {
            SessionPhase::Idle
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    InputEdited { text: String },
    Submitted { text: String },
    GenerationSucceeded,
    GenerationFailed,
    CaptureStarted,
    CaptureTranscribed { text: String },
    CaptureFailed,
    CaptureEnded,
    MuteToggled,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InputEdited { .. } => "input_edited",
            Self::Submitted { .. } => "submitted",
            Self::GenerationSucceeded => "generation_succeeded",
            Self::GenerationFailed => "generation_failed",
            Self::CaptureStarted => "capture_started",
            Self::CaptureTranscribed { .. } => "capture_transcribed",
            Self::CaptureFailed => "capture_failed",
            Self::CaptureEnded => "capture_ended",
            Self::MuteToggled => "mute_toggled",
        }
    }
}

/// Side effects the controller must carry out after a transition, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionAction {
    RecordUserTurn,
    GenerateReply,
    RecordBotTurn,
    Speak,
    BeginCapture,
    SubmitTranscript,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: SessionPhase,
    pub to: SessionPhase,
    pub event: SessionEvent,
    pub state: SessionState,
    pub actions: Vec<SessionAction>,
}
