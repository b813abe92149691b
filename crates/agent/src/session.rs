use std::sync::{Arc, Mutex, MutexGuard};

use foodie_core::domain::conversation::{ConversationLog, Turn};
use foodie_core::session::{
    SessionAction, SessionEvent, SessionMachine, SessionPhase, SessionState,
    SessionTransitionError, TransitionOutcome,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::generator::{GenerationError, ResponseGenerator};
use crate::intent::{Intent, IntentClassifier};
use crate::voice::{
    CaptureError, CaptureOutcome, NoopSpeechCapture, NoopSpeechOutput, SpeechCapture,
    SpeechOutput,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(SessionTransitionError),
    Replied { intent: Intent, reply: String },
    /// The fixed error message was recorded in place of a reply.
    Failed { intent: Intent, error: GenerationError, reply: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureReport {
    Ignored(SessionTransitionError),
    Submitted { transcript: String, outcome: SubmitOutcome },
    Ended,
    Failed(CaptureError),
}

struct SessionInner {
    state: SessionState,
    log: ConversationLog,
}

/// Drives one chat session: input, classification, reply, transcript, speech.
///
/// All transitions go through [`SessionMachine`] under a short-lived lock
/// that is never held across an `.await`, so mute toggles and transcript
/// reads stay available while a freeform reply is in flight.
pub struct SessionController {
    session_id: String,
    machine: SessionMachine,
    classifier: IntentClassifier,
    generator: ResponseGenerator,
    capture: Arc<dyn SpeechCapture>,
    speech: Arc<dyn SpeechOutput>,
    inner: Mutex<SessionInner>,
}

impl SessionController {
    pub fn new(generator: ResponseGenerator) -> Self {
        let machine = SessionMachine::new();
        Self {
            session_id: Uuid::new_v4().to_string(),
            machine,
            classifier: IntentClassifier::default(),
            generator,
            capture: Arc::new(NoopSpeechCapture),
            speech: Arc::new(NoopSpeechOutput),
            inner: Mutex::new(SessionInner {
                state: machine.initial_state(false),
                log: ConversationLog::new(),
            }),
        }
    }

    pub fn with_capture(mut self, capture: Arc<dyn SpeechCapture>) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechOutput>) -> Self {
        self.speech = speech;
        self
    }

    pub fn with_start_muted(self, muted: bool) -> Self {
        self.lock_inner().state.is_muted = muted;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.lock_inner().state.clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock_inner().state.phase()
    }

    pub fn transcript(&self) -> Vec<Turn> {
        self.lock_inner().log.turns().to_vec()
    }

    pub fn set_input(&self, text: &str) {
        let mut inner = self.lock_inner();
        let event = SessionEvent::InputEdited { text: text.to_string() };
        if let Err(error) = self.apply_event(&mut inner, &event, text) {
            warn!(correlation_id = %self.session_id, error = %error, "input edit rejected");
        }
    }

    /// Flips mute and returns the new value. Speech already dispatched keeps
    /// playing.
    pub fn toggle_mute(&self) -> bool {
        let mut inner = self.lock_inner();
        if let Err(error) = self.apply_event(&mut inner, &SessionEvent::MuteToggled, "") {
            warn!(correlation_id = %self.session_id, error = %error, "mute toggle rejected");
        }
        let muted = inner.state.is_muted;
        info!(
            event_name = "session.mute.toggled",
            correlation_id = %self.session_id,
            muted,
            "mute toggled"
        );
        muted
    }

    /// Submits whatever is currently in the input box.
    pub async fn submit_current(&self) -> SubmitOutcome {
        let text = self.lock_inner().state.current_input_text.clone();
        self.submit(&text).await
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let Some(intent) = self.classifier.classify(text) else {
            debug!(
                event_name = "session.submit.ignored",
                correlation_id = %self.session_id,
                reason = "empty_input",
                "ignoring blank submission"
            );
            return SubmitOutcome::Ignored(SessionTransitionError::EmptyInput);
        };
        let local_reply = self.generator.generate_local(&intent);

        // Local replies complete inside the same critical section, so no
        // observer ever sees them as generating.
        let accepted = {
            let mut inner = self.lock_inner();
            let submitted = SessionEvent::Submitted { text: text.to_string() };
            self.apply_event(&mut inner, &submitted, text).and_then(|_| match &local_reply {
                Some(reply) => self
                    .apply_event(&mut inner, &SessionEvent::GenerationSucceeded, reply)
                    .map(|outcome| Some(outcome.actions.contains(&SessionAction::Speak))),
                None => Ok(None),
            })
        };

        let speak_local = match accepted {
            Ok(speak_local) => speak_local,
            Err(rejection) => {
                info!(
                    event_name = "session.submit.ignored",
                    correlation_id = %self.session_id,
                    reason = %rejection,
                    "submission rejected"
                );
                return SubmitOutcome::Ignored(rejection);
            }
        };

        info!(
            event_name = "session.submit.accepted",
            correlation_id = %self.session_id,
            intent = intent.kind(),
            "user turn recorded"
        );

        if let Some(reply) = local_reply {
            if speak_local.unwrap_or(false) {
                self.speech.speak(&reply);
            }
            info!(
                event_name = "session.reply.recorded",
                correlation_id = %self.session_id,
                intent = intent.kind(),
                "local reply recorded"
            );
            return SubmitOutcome::Replied { intent, reply };
        }

        let (event, reply, outcome) = match self.generator.generate(&intent, text).await {
            Ok(reply) => (
                SessionEvent::GenerationSucceeded,
                reply.clone(),
                SubmitOutcome::Replied { intent, reply },
            ),
            Err(error) => {
                warn!(
                    event_name = "session.reply.failed",
                    correlation_id = %self.session_id,
                    error = %error,
                    "generation failed; recording fixed error message"
                );
                let reply = self.generator.responses().generation_error().to_string();
                (
                    SessionEvent::GenerationFailed,
                    reply.clone(),
                    SubmitOutcome::Failed { intent, error, reply },
                )
            }
        };

        let completed = {
            let mut inner = self.lock_inner();
            self.apply_event(&mut inner, &event, &reply)
        };
        match completed {
            Ok(transition) => {
                if transition.actions.contains(&SessionAction::Speak) {
                    self.speech.speak(&reply);
                }
                info!(
                    event_name = "session.reply.recorded",
                    correlation_id = %self.session_id,
                    outcome = event.name(),
                    "freeform reply recorded"
                );
            }
            Err(error) => warn!(
                correlation_id = %self.session_id,
                error = %error,
                "could not record generation result"
            ),
        }

        outcome
    }

    /// Runs one voice capture. A transcript becomes the input text and is
    /// submitted like typed input.
    pub async fn start_voice_capture(&self) -> CaptureReport {
        let started = {
            let mut inner = self.lock_inner();
            self.apply_event(&mut inner, &SessionEvent::CaptureStarted, "")
        };
        if let Err(rejection) = started {
            debug!(
                event_name = "session.capture.ignored",
                correlation_id = %self.session_id,
                reason = %rejection,
                "capture already in progress"
            );
            return CaptureReport::Ignored(rejection);
        }
        info!(
            event_name = "session.capture.started",
            correlation_id = %self.session_id,
            "listening"
        );

        match self.capture.capture().await {
            Ok(CaptureOutcome::Transcript(transcript)) => {
                let event = SessionEvent::CaptureTranscribed { text: transcript.clone() };
                let transcribed = {
                    let mut inner = self.lock_inner();
                    self.apply_event(&mut inner, &event, &transcript)
                };
                if let Err(error) = transcribed {
                    warn!(correlation_id = %self.session_id, error = %error, "transcript dropped");
                    return CaptureReport::Ignored(error);
                }
                info!(
                    event_name = "session.capture.transcribed",
                    correlation_id = %self.session_id,
                    transcript_chars = transcript.chars().count(),
                    "voice transcript received"
                );
                let outcome = self.submit(&transcript).await;
                CaptureReport::Submitted { transcript, outcome }
            }
            Ok(CaptureOutcome::Ended) => {
                self.stop_listening(&SessionEvent::CaptureEnded);
                info!(
                    event_name = "session.capture.ended",
                    correlation_id = %self.session_id,
                    "capture ended without transcript"
                );
                CaptureReport::Ended
            }
            Err(error) => {
                self.stop_listening(&SessionEvent::CaptureFailed);
                warn!(
                    event_name = "session.capture.failed",
                    correlation_id = %self.session_id,
                    error = %error,
                    "voice capture failed"
                );
                CaptureReport::Failed(error)
            }
        }
    }

    fn stop_listening(&self, event: &SessionEvent) {
        let mut inner = self.lock_inner();
        if let Err(error) = self.apply_event(&mut inner, event, "") {
            warn!(correlation_id = %self.session_id, error = %error, "capture stop rejected");
        }
    }

    /// Applies `event`, stores the next state, and records any turn the
    /// transition asks for using `turn_text`.
    fn apply_event(
        &self,
        inner: &mut SessionInner,
        event: &SessionEvent,
        turn_text: &str,
    ) -> Result<TransitionOutcome, SessionTransitionError> {
        let outcome = self.machine.apply(&inner.state, event)?;
        inner.state = outcome.state.clone();
        for action in &outcome.actions {
            match action {
                SessionAction::RecordUserTurn => inner.log.append(Turn::user(turn_text)),
                SessionAction::RecordBotTurn => inner.log.append(Turn::bot(turn_text)),
                SessionAction::GenerateReply
                | SessionAction::Speak
                | SessionAction::BeginCapture
                | SessionAction::SubmitTranscript => {}
            }
        }
        Ok(outcome)
    }

    fn lock_inner(&self) -> MutexGuard<'_, SessionInner> {
        match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
