//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate archive and collection calls into note-level APIs.
//! - Keep UI layers decoupled from container and encoding details.

pub mod note_service;
