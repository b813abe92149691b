pub mod bootstrap;
pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use foodie_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use foodie_core::responses::ResponseKey;

#[derive(Debug, Parser)]
#[command(
    name = "foodie",
    about = "Foodie GPT restaurant assistant",
    long_about = "Chat with the Foodie GPT assistant, ask one-off questions, browse the menu, and inspect configuration.",
    after_help = "Examples:\n  foodie chat\n  foodie ask \"pizza please\"\n  foodie menu --category salad\n  foodie phrases --key delivery_time\n  foodie config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a foodie.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override logging.level (trace, debug, info, warn, error)")]
    log_level: Option<String>,
    #[arg(long, global = true, help = "Override llm.model")]
    model: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive chat session (/menu, /voice, /mute, /quit)")]
    Chat {
        #[arg(long, help = "Start with spoken replies muted")]
        muted: bool,
    },
    #[command(about = "Send one message and print the resulting transcript as JSON")]
    Ask {
        #[arg(required = true, num_args = 1.., help = "Message text")]
        text: Vec<String>,
    },
    #[command(about = "List the menu catalog as JSON")]
    Menu {
        #[arg(long, help = "Only list items in this category")]
        category: Option<String>,
    },
    #[command(about = "List the canned phrases (delivery time, payment methods, ...) as JSON")]
    Phrases {
        #[arg(long, help = "Only show this phrase, e.g. delivery_time or payment-methods")]
        key: Option<ResponseKey>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let start_muted = match self.command {
            Command::Chat { muted: true } => Some(true),
            _ => None,
        };
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                log_level: self.log_level.clone(),
                llm_model: self.model.clone(),
                start_muted,
                ..ConfigOverrides::default()
            },
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    // Commands report config errors themselves; logging just needs a best effort.
    if let Ok(config) = AppConfig::load(options.clone()) {
        logging::init(&config.logging);
    }

    let result = match cli.command {
        Command::Chat { .. } => commands::chat::run(&options),
        Command::Ask { text } => commands::ask::run(&options, &text.join(" ")),
        Command::Menu { category } => commands::menu::run(&options, category.as_deref()),
        Command::Phrases { key } => commands::phrases::run(key),
        Command::Config => commands::config::run(&options),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use foodie_core::responses::ResponseKey;

    use super::{Cli, Command};

    #[test]
    fn chat_muted_flag_becomes_an_override() {
        let cli = Cli::try_parse_from(["foodie", "chat", "--muted"]).expect("args should parse");
        assert_eq!(cli.load_options().overrides.start_muted, Some(true));
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "foodie",
            "ask",
            "pizza",
            "please",
            "--model",
            "gemini-1.5-pro",
            "--config",
            "custom.toml",
        ])
        .expect("args should parse");

        let options = cli.load_options();
        assert_eq!(options.overrides.llm_model.as_deref(), Some("gemini-1.5-pro"));
        assert!(options.require_file);
        assert_eq!(options.overrides.start_muted, None);
    }

    #[test]
    fn phrase_keys_accept_either_separator() {
        let cli = Cli::try_parse_from(["foodie", "phrases", "--key", "payment-methods"])
            .expect("args should parse");
        assert!(matches!(
            cli.command,
            Command::Phrases { key: Some(ResponseKey::PaymentMethods) }
        ));
        assert!(Cli::try_parse_from(["foodie", "phrases", "--key", "dessert_menu"]).is_err());
    }

    #[test]
    fn ask_requires_text() {
        assert!(Cli::try_parse_from(["foodie", "ask"]).is_err());
    }
}
