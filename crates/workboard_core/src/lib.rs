//! Core document and data logic for Workboard.
//! This crate is the single source of truth for editor and cache invariants.

pub mod cache;
pub mod editor;
pub mod logging;
pub mod markdown;
pub mod model;
pub mod service;

pub use cache::{
    build_cache_key, ApiCache, CacheConfig, CacheStats, Clock, FetchError, FetchResult,
    ManualClock, QueryParams, SystemClock, DEFAULT_CACHE_TTL,
};
pub use editor::document::{Document, DocumentError, DocumentResult, MoveDirection};
pub use editor::reference::{
    reference_matches, search_members, search_tasks, MemberRef, ReferenceDirectory,
    ReferenceMatch, ReferenceSearch, SearchKeyOutcome, TaskRef, MAX_REFERENCE_MATCHES,
};
pub use editor::slash::{filter_commands, slash_commands, SlashCommand, SlashMenu, SlashOutcome};
pub use editor::NavKey;
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use markdown::{parse, serialize};
pub use model::block::{
    Block, BlockId, BlockKind, BlockType, BlockValidationError, CalloutIcon,
};
pub use model::form::{
    FieldProblem, FieldProblemKind, FormDefinition, FormField, FormFieldType, FormSubmission,
};
pub use service::form_service::{FormBackend, FormError, FormResult, PublicFormService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
