//! Workflow steps between a finished selection and a pushed image.
//!
//! # Pipeline
//!
//! ```text
//! build_and_push(plan)
//!   1. Engine check ── docker info
//!   2. Build        ── docker build [--platform P] -t REG/REPO:TAG -f DOCKERFILE CONTEXT
//!   3. Tag latest   ── docker tag REG/REPO:TAG REG/REPO:latest   (unless skip_latest)
//!   4. Push         ── docker push REG/REPO:TAG
//!   5. Push latest  ── docker push REG/REPO:latest               (unless skip_latest)
//! ```
//!
//! The first failing step stops the run. Nothing already built or pushed is
//! rolled back.

pub mod discover;
pub mod pipeline;
pub mod resolve;
pub mod session;

pub use discover::find_dockerfiles;
pub use pipeline::{Step, build_and_push};
pub use resolve::resolve_registry;
pub use session::{open_session, resume_session, tenant_mismatch};
