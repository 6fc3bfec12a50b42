//! Bizdesk - natural-language commands for the business tracker
//!
//! Free-form requests (a task ask, a calendar instruction, raw meeting notes,
//! a project brief) are grounded against the store, interpreted by a hosted
//! model, validated, resolved to concrete ids and applied with per-item
//! permission checks.

pub mod command;
pub mod core;
pub mod domain;
pub mod llm;
