//! Spicchio: a pie-menu launcher daemon driven over a Unix socket.

pub mod catalog;
pub mod config;
pub mod events;
pub mod icons;
pub mod launcher;
pub mod protocol;
pub mod settings;
pub mod sys;
pub mod view;
