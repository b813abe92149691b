use foodie_agent::intent::Intent;
use foodie_agent::session::SubmitOutcome;
use foodie_core::config::LoadOptions;
use foodie_core::domain::conversation::Turn;
use foodie_core::errors::ApplicationError;
use serde::Serialize;

use crate::bootstrap;
use crate::commands::{build_runtime, load_config, CommandResult};

#[derive(Debug, Serialize)]
struct AskOutput {
    command: &'static str,
    status: &'static str,
    error_class: Option<&'static str>,
    session_id: String,
    intent: Intent,
    transcript: Vec<Turn>,
}

pub fn run(options: &LoadOptions, text: &str) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("ask", &error),
    };
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error("ask", &error),
    };
    let controller = match bootstrap::build_controller(&config) {
        Ok(controller) => controller,
        Err(error) => return CommandResult::from_error("ask", &error),
    };

    let outcome = runtime.block_on(controller.submit(text));

    let (intent, failure) = match outcome {
        SubmitOutcome::Ignored(rejection) => {
            let error = ApplicationError::from(rejection);
            return CommandResult::failure(
                "ask",
                error.error_class(),
                error.user_message(),
                error.exit_code(),
            );
        }
        SubmitOutcome::Replied { intent, .. } => (intent, None),
        SubmitOutcome::Failed { intent, error, .. } => {
            (intent, Some(ApplicationError::Generation(error.to_string())))
        }
    };

    let payload = AskOutput {
        command: "ask",
        status: if failure.is_some() { "error" } else { "ok" },
        error_class: failure.as_ref().map(ApplicationError::error_class),
        session_id: controller.session_id().to_string(),
        intent,
        transcript: controller.transcript(),
    };
    CommandResult::json(failure.map(|error| error.exit_code()).unwrap_or(0), &payload)
}
