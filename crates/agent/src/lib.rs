//! Conversation runtime for Foodie GPT.
//!
//! Each user message flows through a constrained loop:
//! 1. **Classification** (`intent`) - map raw text to an [`Intent`]
//! 2. **Generation** (`generator`) - answer locally from the catalog and
//!    canned responses, or hand freeform text to the language model (`llm`, `gemini`)
//! 3. **Session bookkeeping** (`session`) - record turns, track loading and
//!    listening flags, decide whether the reply is spoken (`voice`)
//!
//! The language model only ever sees freeform questions. Greetings and menu
//! recommendations are answered deterministically from local data.

pub mod gemini;
pub mod generator;
pub mod intent;
pub mod llm;
pub mod session;
pub mod voice;

pub use generator::{GenerationError, ResponseGenerator};
pub use intent::{Intent, IntentClassifier};
pub use llm::{CompletionRequest, LlmClient};
pub use session::{CaptureReport, SessionController, SubmitOutcome};
