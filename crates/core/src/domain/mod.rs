pub mod conversation;
pub mod menu;
