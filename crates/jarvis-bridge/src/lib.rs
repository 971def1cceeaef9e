//! Jarvis hardware bridge.
//!
//! A small HTTP control surface that lets a phone (or a script) run commands,
//! launch applications, print files and power-cycle the host it runs on, and
//! that relays notifications from the host back to the phone.

pub mod api;
pub mod client;
pub mod config;
pub mod host;
pub mod net;
pub mod notifications;
pub mod smart_home;
