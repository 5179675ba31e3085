pub mod chat;
pub mod command;
