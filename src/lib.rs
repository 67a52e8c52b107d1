// ABOUTME: Library root for coursebot — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod app;
pub mod chat;
pub mod config;
pub mod session;
pub mod storage;
pub mod tui;
pub mod widget;
pub mod wizard;
