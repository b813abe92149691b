use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use foodie_agent::session::{CaptureReport, SessionController};
use foodie_core::catalog::Catalog;
use foodie_core::config::LoadOptions;
use foodie_core::domain::conversation::{Speaker, Turn};
use foodie_core::errors::ApplicationError;
use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines,
};
use tracing::info;

use crate::bootstrap;
use crate::commands::{build_runtime, load_config, CommandResult};

const BANNER: &str =
    "Foodie GPT is ready. Type a message, or /menu, /voice, /mute, /quit.";
const USER_PREFIX: &str = "you> ";
const BOT_PREFIX: &str = "bot> ";
const BUSY_NOTICE: &str = "(still working on the last reply; only /mute and /quit work now)";
const STATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatInput {
    Blank,
    Message(String),
    Menu,
    Voice,
    Mute,
    Quit,
    Unknown(String),
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("chat", &error),
    };
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error("chat", &error),
    };
    let controller = match bootstrap::build_controller(&config) {
        Ok(controller) => controller,
        Err(error) => return CommandResult::from_error("chat", &error),
    };
    let catalog = bootstrap::catalog(&config);

    let session = chat_loop(
        &controller,
        &catalog,
        BufReader::new(io::stdin()),
        io::stdout(),
        tokio::signal::ctrl_c(),
    );
    match runtime.block_on(session) {
        Ok(()) => CommandResult::quiet(),
        Err(error) => CommandResult::from_error(
            "chat",
            &ApplicationError::Runtime(format!("terminal i/o failed: {error}")),
        ),
    }
}

async fn chat_loop<R, W, I>(
    controller: &SessionController,
    catalog: &Catalog,
    input: R,
    output: W,
    interrupt: I,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: Future<Output = io::Result<()>>,
{
    // One listener for the whole session, so Ctrl-C is seen mid-reply too.
    tokio::pin!(interrupt);
    let mut terminal = Terminal { lines: input.lines(), output, input_closed: false };
    let mut rendered = 0usize;

    terminal.write_line(BANNER).await?;
    loop {
        terminal.prompt().await?;

        let line = tokio::select! {
            line = terminal.lines.next_line() => line?,
            _ = interrupt.as_mut() => None,
        };
        let Some(line) = line else {
            terminal.write_line("").await?;
            break;
        };

        // Typed text is already on screen after the prompt.
        let mut echo_user = false;
        match parse_input(&line) {
            ChatInput::Blank => continue,
            ChatInput::Quit => break,
            ChatInput::Menu => terminal.write_line(&render_menu(catalog)).await?,
            ChatInput::Mute => terminal.mute_notice(controller.toggle_mute()).await?,
            ChatInput::Voice => {
                terminal.write_line("(listening...)").await?;
                let capture = controller.start_voice_capture();
                let Some(report) = terminal.drive(controller, &mut interrupt, capture).await? else {
                    break;
                };
                match report {
                    CaptureReport::Submitted { .. } => echo_user = true,
                    CaptureReport::Ended => terminal.write_line("(no speech detected)").await?,
                    CaptureReport::Failed(error) => {
                        terminal.write_line(&format!("(voice input failed: {error})")).await?;
                    }
                    CaptureReport::Ignored(_) => {
                        terminal.write_line("(already listening)").await?;
                    }
                }
            }
            ChatInput::Message(text) => {
                controller.set_input(&text);
                let submit = controller.submit_current();
                if terminal.drive(controller, &mut interrupt, submit).await?.is_none() {
                    break;
                }
            }
            ChatInput::Unknown(command) => {
                terminal.write_line(&format!("(unknown command `{command}`)")).await?;
            }
        }

        let transcript = controller.transcript();
        for turn in transcript.iter().skip(rendered) {
            if turn.speaker == Speaker::User && !echo_user {
                continue;
            }
            terminal.write_line(&format_turn(turn)).await?;
        }
        rendered = transcript.len();
    }

    info!(
        event_name = "session.chat.closed",
        correlation_id = %controller.session_id(),
        turns = rendered,
        "chat session closed"
    );
    Ok(())
}

struct Terminal<R, W> {
    lines: Lines<R>,
    output: W,
    input_closed: bool,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn prompt(&mut self) -> io::Result<()> {
        self.output.write_all(USER_PREFIX.as_bytes()).await?;
        self.output.flush().await
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }

    async fn mute_notice(&mut self, muted: bool) -> io::Result<()> {
        self.write_line(if muted { "(replies muted)" } else { "(replies will be spoken)" }).await
    }

    /// Awaits `task` while still reading the terminal. Only `/mute` and
    /// `/quit` act during that time. `None` means the user quit or pressed
    /// Ctrl-C before the task finished.
    async fn drive<F, I>(
        &mut self,
        controller: &SessionController,
        interrupt: &mut Pin<&mut I>,
        task: F,
    ) -> io::Result<Option<F::Output>>
    where
        F: Future,
        I: Future<Output = io::Result<()>>,
    {
        tokio::pin!(task);
        let mut ticker = tokio::time::interval(STATE_POLL_INTERVAL);
        let mut announced = false;

        loop {
            tokio::select! {
                biased;
                _ = interrupt.as_mut() => return Ok(None),
                output = &mut task => return Ok(Some(output)),
                _ = ticker.tick(), if !announced => {
                    if controller.state().is_generating {
                        self.write_line("(thinking...)").await?;
                        announced = true;
                    }
                }
                line = self.lines.next_line(), if !self.input_closed => match line? {
                    None => self.input_closed = true,
                    Some(line) => match parse_input(&line) {
                        ChatInput::Blank => {}
                        ChatInput::Mute => self.mute_notice(controller.toggle_mute()).await?,
                        ChatInput::Quit => return Ok(None),
                        _ => self.write_line(BUSY_NOTICE).await?,
                    },
                },
            }
        }
    }
}

fn parse_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Blank;
    }
    if !trimmed.starts_with('/') {
        return ChatInput::Message(line.to_string());
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "/menu" => ChatInput::Menu,
        "/voice" => ChatInput::Voice,
        "/mute" => ChatInput::Mute,
        "/quit" | "/exit" => ChatInput::Quit,
        _ => ChatInput::Unknown(trimmed.to_string()),
    }
}

/// Prefixes the first line with the speaker and indents the rest under it.
fn format_turn(turn: &Turn) -> String {
    let prefix = match turn.speaker {
        Speaker::User => USER_PREFIX,
        Speaker::Bot => BOT_PREFIX,
    };
    let indent = " ".repeat(prefix.len());
    turn.text
        .lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                format!("{prefix}{line}")
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_menu(catalog: &Catalog) -> String {
    catalog
        .categories()
        .iter()
        .map(|category| {
            let lines = catalog.recommendations_for(category).join("\n  ");
            format!("{category}:\n  {lines}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use foodie_agent::generator::ResponseGenerator;
    use foodie_agent::llm::{CompletionRequest, LlmClient};
    use foodie_agent::session::SessionController;
    use foodie_agent::voice::InMemorySpeechOutput;
    use foodie_core::catalog::Catalog;
    use foodie_core::domain::conversation::Turn;
    use foodie_core::responses::ResponseLibrary;
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio::sync::{oneshot, Notify};

    use super::{chat_loop, format_turn, parse_input, render_menu, ChatInput, BUSY_NOTICE};

    #[derive(Default)]
    struct HeldLlm {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl LlmClient for HeldLlm {
        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<String> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("Today's special is mushroom risotto.".to_string())
        }
    }

    fn controller(llm: Arc<HeldLlm>, speech: InMemorySpeechOutput) -> SessionController {
        let generator =
            ResponseGenerator::new(Arc::new(Catalog::default()), ResponseLibrary::new(), llm);
        SessionController::new(generator).with_speech(Arc::new(speech))
    }

    async fn wait_until(check: impl Fn() -> bool) {
        while !check() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn mute_is_handled_while_a_reply_is_pending() {
        let llm = Arc::new(HeldLlm::default());
        let speech = InMemorySpeechOutput::default();
        let controller = controller(llm.clone(), speech.clone());
        let catalog = Catalog::default();
        let (mut keyboard, terminal_input) = tokio::io::duplex(1024);
        let mut screen = Vec::new();

        let session = chat_loop(
            &controller,
            &catalog,
            BufReader::new(terminal_input),
            &mut screen,
            std::future::pending::<std::io::Result<()>>(),
        );
        let user = async {
            keyboard.write_all(b"what's the special today?\n").await.expect("type question");
            llm.started.notified().await;
            keyboard.write_all(b"/mute\nburger\n").await.expect("type while pending");
            wait_until(|| controller.state().is_muted).await;
            llm.release.notify_one();
            wait_until(|| controller.transcript().len() == 2).await;
            keyboard.write_all(b"/quit\n").await.expect("type quit");
        };
        let (result, ()) = tokio::join!(session, user);
        result.expect("chat loop should finish cleanly");

        assert!(speech.spoken().is_empty(), "reply finished after mute must stay silent");
        assert_eq!(controller.transcript().len(), 2, "busy input is not submitted");

        let screen = String::from_utf8(screen).expect("utf8 output");
        let muted_at = screen.find("(replies muted)").expect("mute notice shown");
        let reply_at = screen.find("bot> Today's special").expect("reply rendered");
        assert!(muted_at < reply_at);
        assert!(screen.contains("(thinking...)"));
        assert!(screen.contains(BUSY_NOTICE));
    }

    #[tokio::test]
    async fn interrupt_ends_the_session_while_a_reply_is_pending() {
        let llm = Arc::new(HeldLlm::default());
        let controller = controller(llm.clone(), InMemorySpeechOutput::default());
        let catalog = Catalog::default();
        let (mut keyboard, terminal_input) = tokio::io::duplex(1024);
        let (interrupt_tx, interrupt_rx) = oneshot::channel::<()>();
        let mut screen = Vec::new();

        let session = chat_loop(
            &controller,
            &catalog,
            BufReader::new(terminal_input),
            &mut screen,
            async move {
                let _ = interrupt_rx.await;
                Ok(())
            },
        );
        let user = async {
            keyboard.write_all(b"tell me a story\n").await.expect("type question");
            llm.started.notified().await;
            let _ = interrupt_tx.send(());
        };
        let (result, ()) = tokio::join!(session, user);

        result.expect("interrupt should end the loop without error");
        assert_eq!(controller.transcript(), vec![Turn::user("tell me a story")]);
    }

    #[test]
    fn slash_commands_are_case_insensitive() {
        assert_eq!(parse_input("/MENU"), ChatInput::Menu);
        assert_eq!(parse_input("  /mute "), ChatInput::Mute);
        assert_eq!(parse_input("/exit"), ChatInput::Quit);
        assert_eq!(parse_input("/dance"), ChatInput::Unknown("/dance".to_string()));
    }

    #[test]
    fn messages_keep_leading_whitespace() {
        assert_eq!(parse_input("  pizza please"), ChatInput::Message("  pizza please".to_string()));
        assert_eq!(parse_input("   "), ChatInput::Blank);
    }

    #[test]
    fn multi_line_bot_turns_are_indented() {
        let turn = Turn::bot("Here are some salad recommendations:\nCaesar Salad - ₹150");
        assert_eq!(
            format_turn(&turn),
            "bot> Here are some salad recommendations:\n     Caesar Salad - ₹150"
        );
        assert_eq!(format_turn(&Turn::user("hi")), "you> hi");
    }

    #[test]
    fn menu_groups_items_by_category() {
        let menu = render_menu(&Catalog::default());
        assert!(menu.starts_with("pizza:\n  Margherita Pizza - ₹300\n  Veggie Supreme Pizza - ₹400"));
        assert!(menu.contains("salad:\n  Caesar Salad - ₹150\n  Greek Salad - ₹180"));
    }
}
