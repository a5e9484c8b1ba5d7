//! Voicepilot - Voice-Operated Page Automation

pub mod command;
pub mod core;
pub mod delivery;
pub mod exec;
pub mod llm;
pub mod page;
pub mod pipeline;
pub mod site;
pub mod speech;
pub mod summary;
