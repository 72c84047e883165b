/// Top-level window and the context it is built from.
pub mod app;
/// Command line arguments.
pub mod cli;
/// Up/down of interfaces through wg-quick.
pub mod controller;
/// Finding configuration files.
pub mod discovery;
pub mod error;
pub mod logger;
/// Status line state shared by tabs.
pub mod notice;
/// Reading and writing configuration files.
pub mod store;
/// One tab per interface.
pub mod tab;
pub mod toast;
