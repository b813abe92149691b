use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::Bot, text: text.into() }
    }
}

/// Append-only transcript of a single session, in arrival order.
///
/// Turns are never removed or edited. The log is dropped with its session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConversationLog, Speaker, Turn};

    #[test]
    fn log_preserves_arrival_order() {
        let mut log = ConversationLog::new();
        log.append(Turn::user("pizza please"));
        log.append(Turn::bot("Here are some pizza recommendations:"));
        log.append(Turn::user("thanks"));

        let speakers = log.turns().iter().map(|turn| turn.speaker).collect::<Vec<_>>();
        assert_eq!(speakers, vec![Speaker::User, Speaker::Bot, Speaker::User]);
        assert_eq!(log.turns()[2].text, "thanks");
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn turns_serialize_with_snake_case_speaker() {
        let turn = Turn::bot("hello");
        let encoded = serde_json::to_string(&turn).expect("turn should serialize");
        assert_eq!(encoded, r#"{"speaker":"bot","text":"hello"}"#);
    }
}
