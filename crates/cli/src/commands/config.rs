use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use foodie_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct SourceContext {
    file_doc: Option<Value>,
    file_path: Option<PathBuf>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &error),
    };

    let file_path = resolve_config_path(options.config_path.as_deref());
    let context = SourceContext { file_doc: load_config_file_doc(file_path.as_deref()), file_path };

    CommandResult { exit_code: 0, output: render(&config, options, &context) }
}

fn render(config: &AppConfig, options: &LoadOptions, context: &SourceContext) -> String {
    let overrides = &options.overrides;
    let mut lines =
        vec!["effective config (source precedence: cli > env > file > default):".to_string()];

    let llm_api_key = redact_secret(config.llm.api_key.as_ref().map(|key| key.expose_secret()));
    lines.push(context.line(
        "llm.api_key",
        &llm_api_key,
        &["FOODIE_LLM_API_KEY"],
        overrides.llm_api_key.is_some(),
    ));
    lines.push(context.line(
        "llm.base_url",
        &config.llm.base_url,
        &["FOODIE_LLM_BASE_URL"],
        overrides.llm_base_url.is_some(),
    ));
    lines.push(context.line(
        "llm.model",
        &config.llm.model,
        &["FOODIE_LLM_MODEL"],
        overrides.llm_model.is_some(),
    ));
    lines.push(context.line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        &["FOODIE_LLM_TIMEOUT_SECS"],
        false,
    ));
    lines.push(context.line(
        "llm.max_retries",
        &config.llm.max_retries.to_string(),
        &["FOODIE_LLM_MAX_RETRIES"],
        false,
    ));

    lines.push(context.line(
        "voice.speak_command",
        config.voice.speak_command.as_deref().unwrap_or("<unset>"),
        &["FOODIE_VOICE_SPEAK_COMMAND"],
        overrides.speak_command.is_some(),
    ));
    lines.push(context.line(
        "voice.capture_command",
        config.voice.capture_command.as_deref().unwrap_or("<unset>"),
        &["FOODIE_VOICE_CAPTURE_COMMAND"],
        overrides.capture_command.is_some(),
    ));
    lines.push(context.line(
        "voice.language",
        &config.voice.language,
        &["FOODIE_VOICE_LANGUAGE"],
        false,
    ));
    lines.push(context.line(
        "voice.start_muted",
        &config.voice.start_muted.to_string(),
        &["FOODIE_VOICE_START_MUTED"],
        overrides.start_muted.is_some(),
    ));

    lines.push(context.line(
        "catalog.currency_symbol",
        &config.catalog.currency_symbol,
        &["FOODIE_CATALOG_CURRENCY_SYMBOL"],
        false,
    ));

    lines.push(context.line(
        "logging.level",
        &config.logging.level,
        &["FOODIE_LOGGING_LEVEL", "FOODIE_LOG_LEVEL"],
        overrides.log_level.is_some(),
    ));
    lines.push(context.line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        &["FOODIE_LOGGING_FORMAT", "FOODIE_LOG_FORMAT"],
        false,
    ));

    lines.join("\n")
}

impl SourceContext {
    fn line(&self, key_path: &str, value: &str, env_keys: &[&str], overridden: bool) -> String {
        format!("- {key_path} = {value} (source: {})", self.source(key_path, env_keys, overridden))
    }

    fn source(&self, key_path: &str, env_keys: &[&str], overridden: bool) -> String {
        if overridden {
            return "cli".to_string();
        }

        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn redact_secret(secret: Option<&str>) -> String {
    match secret.map(str::trim) {
        None => "<unset>".to_string(),
        Some("") => "<empty>".to_string(),
        Some(_) => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_path, redact_secret};

    #[test]
    fn secrets_never_render_in_clear_text() {
        assert_eq!(redact_secret(None), "<unset>");
        assert_eq!(redact_secret(Some("  ")), "<empty>");
        assert_eq!(redact_secret(Some("AIza-test-key")), "<redacted>");
    }

    #[test]
    fn nested_keys_are_found_in_toml_documents() {
        let doc = "[llm]\nmodel = \"gemini-1.5-pro\"\n".parse::<toml::Value>().expect("valid toml");
        assert!(contains_path(&doc, "llm.model"));
        assert!(!contains_path(&doc, "llm.api_key"));
        assert!(!contains_path(&doc, "voice.language"));
    }
}
