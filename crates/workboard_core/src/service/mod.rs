//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate backend calls into use-case level APIs.
//! - Keep UI layers decoupled from transport details.

pub mod form_service;
