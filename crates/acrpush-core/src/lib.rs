//! Core types for acr-push.
//!
//! This crate holds the resolved run configuration ([`Settings`]), the
//! validated build description ([`BuildPlan`]), the wizard's progressively
//! filled [`Selection`], and the tag version suggestion engine in
//! [`version`]. Nothing here talks to external tools.

pub mod config;
pub mod error;
pub mod plan;
pub mod selection;
pub mod version;

pub use config::{LogLevel, Settings};
pub use error::{Result, WorkflowError};
pub use plan::{BuildPlan, validate_paths};
pub use selection::{Choice, Selection};
pub use version::{CUSTOM_TAG, SemVer, build_tag_options, max_semantic_version, suggest_next_versions};
