use std::sync::Arc;

use foodie_agent::gemini::GeminiClient;
use foodie_agent::generator::ResponseGenerator;
use foodie_agent::llm::{LlmClient, UnconfiguredLlmClient};
use foodie_agent::session::SessionController;
use foodie_agent::voice::{
    CommandSpeechCapture, CommandSpeechOutput, CommandTemplate, NoopSpeechCapture,
    NoopSpeechOutput, SpeechCapture, SpeechOutput,
};
use foodie_core::catalog::Catalog;
use foodie_core::config::{AppConfig, VoiceConfig};
use foodie_core::errors::ApplicationError;
use foodie_core::responses::ResponseLibrary;
use tracing::{info, warn};

pub fn catalog(config: &AppConfig) -> Catalog {
    Catalog::default().with_currency_symbol(config.catalog.currency_symbol.clone())
}

/// Wires a session controller from validated config.
pub fn build_controller(config: &AppConfig) -> Result<SessionController, ApplicationError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        model = %config.llm.model,
        "building session controller"
    );

    let llm: Arc<dyn LlmClient> = if config.llm.has_api_key() {
        let client = GeminiClient::from_config(&config.llm)
            .map_err(|error| ApplicationError::Configuration(error.to_string()))?;
        Arc::new(client)
    } else {
        warn!(
            event_name = "system.bootstrap.llm_unconfigured",
            correlation_id = "bootstrap",
            "llm.api_key is not set; freeform questions will get the error reply"
        );
        Arc::new(UnconfiguredLlmClient)
    };

    let generator =
        ResponseGenerator::new(Arc::new(catalog(config)), ResponseLibrary::new(), llm);
    let controller = SessionController::new(generator)
        .with_capture(speech_capture(&config.voice)?)
        .with_speech(speech_output(&config.voice)?)
        .with_start_muted(config.voice.start_muted);

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = %controller.session_id(),
        voice_capture = config.voice.capture_command.is_some(),
        voice_output = config.voice.speak_command.is_some(),
        "session controller ready"
    );
    Ok(controller)
}

fn speech_capture(voice: &VoiceConfig) -> Result<Arc<dyn SpeechCapture>, ApplicationError> {
    match voice.capture_command.as_deref() {
        Some(command) => {
            let template = parse_template("voice.capture_command", command)?;
            Ok(Arc::new(CommandSpeechCapture::new(template, voice.language.clone())))
        }
        None => Ok(Arc::new(NoopSpeechCapture)),
    }
}

fn speech_output(voice: &VoiceConfig) -> Result<Arc<dyn SpeechOutput>, ApplicationError> {
    match voice.speak_command.as_deref() {
        Some(command) => {
            let template = parse_template("voice.speak_command", command)?;
            Ok(Arc::new(CommandSpeechOutput::new(template, voice.language.clone())))
        }
        None => Ok(Arc::new(NoopSpeechOutput)),
    }
}

fn parse_template(field: &str, command: &str) -> Result<CommandTemplate, ApplicationError> {
    CommandTemplate::parse(command)
        .map_err(|error| ApplicationError::Configuration(format!("{field}: {error}")))
}

#[cfg(test)]
mod tests {
    use foodie_core::config::AppConfig;
    use foodie_core::errors::ApplicationError;

    use super::{build_controller, catalog};

    #[test]
    fn missing_voice_program_is_a_configuration_error() {
        let mut config = AppConfig::default();
        config.voice.speak_command = Some("definitely-not-a-real-tts-binary {text}".to_string());

        match build_controller(&config) {
            Err(ApplicationError::Configuration(message)) => {
                assert!(message.starts_with("voice.speak_command"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected configuration error"),
        }
    }

    #[test]
    fn controller_starts_muted_when_configured() {
        let mut config = AppConfig::default();
        config.voice.start_muted = true;

        let controller = build_controller(&config).expect("default config should build");
        assert!(controller.state().is_muted);
    }

    #[test]
    fn catalog_uses_configured_currency_symbol() {
        let mut config = AppConfig::default();
        config.catalog.currency_symbol = "$".to_string();

        let recommendations = catalog(&config).recommendations_for("salad");
        assert_eq!(recommendations[0], "Caesar Salad - $150");
    }
}
