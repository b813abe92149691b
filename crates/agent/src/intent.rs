use foodie_core::responses::ResponseLibrary;
use serde::{Deserialize, Serialize};

/// Category keywords in match priority order.
pub const CATEGORY_PRIORITY: [&str; 3] = ["pizza", "burger", "salad"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Welcome,
    CategoryRecommendation { category: String },
    Freeform,
}

impl Intent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::CategoryRecommendation { .. } => "category_recommendation",
            Self::Freeform => "freeform",
        }
    }
}

#[derive(Clone, Debug)]
pub struct IntentClassifier {
    welcome_text: String,
    category_keywords: Vec<String>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(
            ResponseLibrary::new().welcome(),
            CATEGORY_PRIORITY.iter().map(|keyword| keyword.to_string()).collect(),
        )
    }
}

impl IntentClassifier {
    pub fn new(welcome_text: impl Into<String>, category_keywords: Vec<String>) -> Self {
        Self {
            welcome_text: welcome_text.into().to_lowercase(),
            category_keywords: category_keywords
                .into_iter()
                .map(|keyword| keyword.to_lowercase())
                .collect(),
        }
    }

    pub fn category_keywords(&self) -> &[String] {
        &self.category_keywords
    }

    /// Returns `None` for blank input; nothing is classified in that case.
    ///
    /// The welcome rule checks that the *welcome text contains the input*, so
    /// only fragments of the welcome message ("welcome", "foodie gpt", "hi")
    /// select it. Keep that direction.
    pub fn classify(&self, raw_input: &str) -> Option<Intent> {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return None;
        }

        let lowered = trimmed.to_lowercase();
        if self.welcome_text.contains(&lowered) {
            return Some(Intent::Welcome);
        }

        let intent = self
            .category_keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(|keyword| Intent::CategoryRecommendation { category: keyword.clone() })
            .unwrap_or(Intent::Freeform);
        Some(intent)
    }
}

#[cfg(test)]
mod tests {
    use foodie_core::responses::ResponseLibrary;

    use super::{Intent, IntentClassifier};

    fn category(name: &str) -> Option<Intent> {
        Some(Intent::CategoryRecommendation { category: name.to_string() })
    }

    #[test]
    fn blank_input_is_not_classified() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.classify(""), None);
        assert_eq!(classifier.classify("   \n\t"), None);
    }

    #[test]
    fn fragments_of_the_welcome_text_select_welcome() {
        let classifier = IntentClassifier::default();
        let inputs = ["welcome", "WELCOME TO FOODIE GPT", "  foodie gpt  ", "hi", "menu recommendations"];
        for input in inputs {
            assert_eq!(classifier.classify(input), Some(Intent::Welcome), "input: {input:?}");
        }
    }

    #[test]
    fn greetings_outside_the_welcome_text_do_not_select_welcome() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.classify("hello there"), Some(Intent::Freeform));
        assert_eq!(classifier.classify("welcome me please"), Some(Intent::Freeform));
    }

    #[test]
    fn every_substring_of_the_welcome_text_is_welcome() {
        let classifier = IntentClassifier::default();
        let chars = ResponseLibrary::new().welcome().chars().collect::<Vec<_>>();
        for start in (0..chars.len()).step_by(7) {
            for end in (start + 1..=chars.len()).step_by(5) {
                let fragment = chars[start..end].iter().collect::<String>();
                if fragment.trim().is_empty() {
                    continue;
                }
                assert_eq!(
                    classifier.classify(&fragment),
                    Some(Intent::Welcome),
                    "fragment: {fragment:?}"
                );
            }
        }
    }

    #[test]
    fn category_keywords_match_case_insensitively() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.classify("pizza please"), category("pizza"));
        assert_eq!(classifier.classify("Any good BURGERS?"), category("burger"));
        assert_eq!(classifier.classify("light salad for lunch"), category("salad"));
    }

    #[test]
    fn first_keyword_in_priority_order_wins() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.classify("salad or burger or pizza"), category("pizza"));
        assert_eq!(classifier.classify("a salad and a burger"), category("burger"));
    }

    #[test]
    fn everything_else_is_freeform() {
        let classifier = IntentClassifier::default();
        let intent = classifier.classify("what goes well with biryani?");
        assert_eq!(intent, Some(Intent::Freeform));
    }

    #[test]
    fn custom_priority_list_is_respected() {
        let classifier =
            IntentClassifier::new("Hello!", vec!["Salad".to_string(), "pizza".to_string()]);
        assert_eq!(classifier.classify("pizza with salad"), category("salad"));
        assert_eq!(classifier.category_keywords(), ["salad".to_string(), "pizza".to_string()]);
    }
}
