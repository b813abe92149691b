use foodie_core::responses::{ResponseKey, ResponseLibrary};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct PhrasesOutput {
    command: &'static str,
    status: &'static str,
    phrases: Vec<PhraseEntry>,
}

#[derive(Debug, Serialize)]
struct PhraseEntry {
    key: ResponseKey,
    text: &'static str,
}

/// Lists the assistant's canned phrases, or just the one for `key`.
pub fn run(key: Option<ResponseKey>) -> CommandResult {
    let library = ResponseLibrary::new();
    let phrases = ResponseKey::ALL
        .into_iter()
        .filter(|candidate| key.map_or(true, |key| key == *candidate))
        .map(|key| PhraseEntry { key, text: library.get(key) })
        .collect();

    CommandResult::json(0, &PhrasesOutput { command: "phrases", status: "ok", phrases })
}
