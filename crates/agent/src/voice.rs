//! Speech side channels for a session.
//!
//! Capture is a one-shot async call; output is fire-and-forget. Both are
//! optional and default to no-ops. The command-backed variants shell out to
//! whatever recognizer or synthesizer the operator configures.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

const LANGUAGE_PLACEHOLDER: &str = "{lang}";
const TEXT_PLACEHOLDER: &str = "{text}";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Transcript(String),
    /// Capture finished without producing any text.
    Ended,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("speech capture is unavailable: {0}")]
    Unavailable(String),
    #[error("speech capture failed: {0}")]
    Failed(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VoiceCommandError {
    #[error("voice command is empty")]
    EmptyCommand,
    #[error("voice program `{program}` was not found on PATH")]
    ProgramNotFound { program: String },
}

#[async_trait]
pub trait SpeechCapture: Send + Sync {
    async fn capture(&self) -> Result<CaptureOutcome, CaptureError>;
}

pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

#[derive(Clone, Debug, Default)]
pub struct NoopSpeechCapture;

#[async_trait]
impl SpeechCapture for NoopSpeechCapture {
    async fn capture(&self) -> Result<CaptureOutcome, CaptureError> {
        Ok(CaptureOutcome::Ended)
    }
}

#[derive(Clone, Debug, Default)]
pub struct NoopSpeechOutput;

impl SpeechOutput for NoopSpeechOutput {
    fn speak(&self, _text: &str) {}
}

#[derive(Clone, Default)]
pub struct InMemorySpeechOutput {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl InMemorySpeechOutput {
    pub fn spoken(&self) -> Vec<String> {
        match self.spoken.lock() {
            Ok(spoken) => spoken.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SpeechOutput for InMemorySpeechOutput {
    fn speak(&self, text: &str) {
        match self.spoken.lock() {
            Ok(mut spoken) => spoken.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
    }
}

/// A configured external program plus its argument template.
///
/// `{lang}` in any argument is replaced by the session language. For speech
/// output, `{text}` is replaced by the utterance; without it the utterance is
/// appended as the last argument.
///
/// The command line is split on whitespace only. Quotes are passed through
/// literally, so an argument containing spaces (a voice name such as
/// `Good News`) needs a wrapper script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandTemplate {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandTemplate {
    pub fn parse(command_line: &str) -> Result<Self, VoiceCommandError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or(VoiceCommandError::EmptyCommand)?;
        let resolved = which::which(program)
            .map_err(|_| VoiceCommandError::ProgramNotFound { program: program.to_string() })?;
        Ok(Self { program: resolved, args: parts.map(str::to_string).collect() })
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn render_args(&self, language: &str, text: Option<&str>) -> Vec<String> {
        let mut used_text = false;
        let mut args = self
            .args
            .iter()
            .map(|arg| {
                let mut rendered = arg.replace(LANGUAGE_PLACEHOLDER, language);
                if let Some(text) = text {
                    if rendered.contains(TEXT_PLACEHOLDER) {
                        used_text = true;
                        rendered = rendered.replace(TEXT_PLACEHOLDER, text);
                    }
                }
                rendered
            })
            .collect::<Vec<_>>();

        if let Some(text) = text {
            if !used_text {
                args.push(text.to_string());
            }
        }
        args
    }
}

/// Runs a recognizer program once and reads the transcript from its stdout.
#[derive(Clone, Debug)]
pub struct CommandSpeechCapture {
    command: CommandTemplate,
    language: String,
}

impl CommandSpeechCapture {
    pub fn new(command: CommandTemplate, language: impl Into<String>) -> Self {
        Self { command, language: language.into() }
    }
}

#[async_trait]
impl SpeechCapture for CommandSpeechCapture {
    async fn capture(&self) -> Result<CaptureOutcome, CaptureError> {
        let output = tokio::process::Command::new(self.command.program())
            .args(self.command.render_args(&self.language, None))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|error| CaptureError::Unavailable(error.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CaptureError::Failed(if stderr.is_empty() {
                format!("recognizer exited with {}", output.status)
            } else {
                stderr
            }));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            return Ok(CaptureOutcome::Ended);
        }
        Ok(CaptureOutcome::Transcript(transcript))
    }
}

/// Spawns a synthesizer program per utterance without waiting for it.
#[derive(Clone, Debug)]
pub struct CommandSpeechOutput {
    command: CommandTemplate,
    language: String,
}

impl CommandSpeechOutput {
    pub fn new(command: CommandTemplate, language: impl Into<String>) -> Self {
        Self { command, language: language.into() }
    }
}

impl SpeechOutput for CommandSpeechOutput {
    fn speak(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            warn!(event_name = "voice.speak.skipped", "no async runtime available for speech");
            return;
        }

        let spawned = tokio::process::Command::new(self.command.program())
            .args(self.command.render_args(&self.language, Some(text)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if status.success() => {
                            debug!(event_name = "voice.speak.finished", "speech finished")
                        }
                        Ok(status) => warn!(
                            event_name = "voice.speak.failed",
                            status = %status,
                            "speech program exited unsuccessfully"
                        ),
                        Err(error) => warn!(
                            event_name = "voice.speak.failed",
                            error = %error,
                            "could not wait for speech program"
                        ),
                    }
                });
            }
            Err(error) => warn!(
                event_name = "voice.speak.failed",
                error = %error,
                "could not start speech program"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CaptureOutcome, CommandTemplate, InMemorySpeechOutput, NoopSpeechCapture, SpeechCapture,
        SpeechOutput, VoiceCommandError,
    };

    #[test]
    fn in_memory_output_records_utterances_in_order() {
        let output = InMemorySpeechOutput::default();
        output.speak("first");
        output.clone().speak("second");
        assert_eq!(output.spoken(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn noop_capture_ends_without_transcript() {
        assert_eq!(NoopSpeechCapture.capture().await, Ok(CaptureOutcome::Ended));
    }

    #[test]
    fn empty_or_unknown_commands_are_rejected() {
        assert_eq!(CommandTemplate::parse("   "), Err(VoiceCommandError::EmptyCommand));
        assert_eq!(
            CommandTemplate::parse("definitely-not-a-real-tts-binary --fast"),
            Err(VoiceCommandError::ProgramNotFound {
                program: "definitely-not-a-real-tts-binary".to_string()
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn placeholders_are_rendered() {
        let template = CommandTemplate::parse("echo -v {lang} --say={text}").expect("echo exists");
        assert_eq!(
            template.render_args("en-US", Some("hello")),
            vec!["-v".to_string(), "en-US".to_string(), "--say=hello".to_string()]
        );

        let appended = CommandTemplate::parse("echo -v {lang}").expect("echo exists");
        assert_eq!(
            appended.render_args("hi-IN", Some("namaste")),
            vec!["-v".to_string(), "hi-IN".to_string(), "namaste".to_string()]
        );
        assert_eq!(appended.render_args("hi-IN", None), vec!["-v".to_string(), "hi-IN".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn quotes_are_not_shell_grouped() {
        let template = CommandTemplate::parse("echo -v \"Good News\"").expect("echo exists");
        assert_eq!(
            template.render_args("en-US", None),
            vec!["-v".to_string(), "\"Good".to_string(), "News\"".to_string()]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_capture_reads_stdout_transcript() {
        let template = CommandTemplate::parse("echo two burgers please").expect("echo exists");
        let capture = super::CommandSpeechCapture::new(template, "en-US");
        assert_eq!(
            capture.capture().await,
            Ok(CaptureOutcome::Transcript("two burgers please".to_string()))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_capture_without_output_ends() {
        let template = CommandTemplate::parse("true").expect("true exists");
        let capture = super::CommandSpeechCapture::new(template, "en-US");
        assert_eq!(capture.capture().await, Ok(CaptureOutcome::Ended));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_capture_failure_is_an_error() {
        let template = CommandTemplate::parse("false").expect("false exists");
        let capture = super::CommandSpeechCapture::new(template, "en-US");
        assert!(matches!(capture.capture().await, Err(super::CaptureError::Failed(_))));
    }
}
