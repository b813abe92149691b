use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PERSONA_PREAMBLE: &str = "You are a restaurant assistant bot named Foodie GPT.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKey {
    Welcome,
    DeliveryTime,
    PaymentMethods,
    CustomerSupport,
    ReturnPolicy,
    OrderStatus,
    GenerationError,
}

impl ResponseKey {
    pub const ALL: [ResponseKey; 7] = [
        Self::Welcome,
        Self::DeliveryTime,
        Self::PaymentMethods,
        Self::CustomerSupport,
        Self::ReturnPolicy,
        Self::OrderStatus,
        Self::GenerationError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::DeliveryTime => "delivery_time",
            Self::PaymentMethods => "payment_methods",
            Self::CustomerSupport => "customer_support",
            Self::ReturnPolicy => "return_policy",
            Self::OrderStatus => "order_status",
            Self::GenerationError => "generation_error",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown response key `{0}`")]
pub struct UnknownResponseKey(pub String);

impl FromStr for ResponseKey {
    type Err = UnknownResponseKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| UnknownResponseKey(value.to_string()))
    }
}

/// Fixed canned phrases, keyed by [`ResponseKey`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseLibrary;

impl ResponseLibrary {
    pub fn new() -> Self {
        Self
    }

    pub fn get(&self, key: ResponseKey) -> &'static str {
        match key {
            ResponseKey::Welcome => {
                "Welcome to Foodie GPT! I'm here to help you with menu recommendations and orders."
            }
            ResponseKey::DeliveryTime => {
                "Delivery usually takes 30-45 minutes. Let me know what you'd like to order!"
            }
            ResponseKey::PaymentMethods => {
                "We accept UPI, debit cards, credit cards, and cash on delivery."
            }
            ResponseKey::CustomerSupport => {
                "For help with orders, call our support team at 18009868676."
            }
            ResponseKey::ReturnPolicy => {
                "Food orders cannot be returned. Please check your order before confirming."
            }
            ResponseKey::OrderStatus => {
                "To check your order status, visit the 'My Orders' section on our app."
            }
            ResponseKey::GenerationError => "An error occurred while generating a response.",
        }
    }

    pub fn welcome(&self) -> &'static str {
        self.get(ResponseKey::Welcome)
    }

    pub fn generation_error(&self) -> &'static str {
        self.get(ResponseKey::GenerationError)
    }

    pub fn persona_preamble(&self) -> &'static str {
        PERSONA_PREAMBLE
    }
}

#[cfg(test)]
mod tests {
    use super::{ResponseKey, ResponseLibrary, UnknownResponseKey};

    #[test]
    fn every_key_has_non_empty_text() {
        let library = ResponseLibrary::new();
        for key in ResponseKey::ALL {
            assert!(!library.get(key).trim().is_empty(), "{} should have text", key.as_str());
        }
    }

    #[test]
    fn keys_parse_from_snake_or_kebab_case() {
        assert_eq!("payment_methods".parse::<ResponseKey>(), Ok(ResponseKey::PaymentMethods));
        assert_eq!("Order-Status".parse::<ResponseKey>(), Ok(ResponseKey::OrderStatus));
        assert_eq!(
            "refunds".parse::<ResponseKey>(),
            Err(UnknownResponseKey("refunds".to_string()))
        );
    }

    #[test]
    fn welcome_names_the_assistant() {
        assert!(ResponseLibrary::new().welcome().starts_with("Welcome to Foodie GPT!"));
    }
}
