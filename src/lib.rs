//! Repair Triage API Library
//!
//! This library turns free-text customer repair requests into a single
//! next-step message: the request is sent to a text-completion service
//! together with an instruction template, and the model's structured reply
//! is mapped through a fixed decision table.

pub mod agents;
pub mod api;
pub mod config;
pub mod platform;
