//! # Trellis Editor
//!
//! Authoring operations over a site.
//!
//! [`Site`] is the editable aggregate: the content graph plus site-level
//! configuration, exposing the CRUD contract the authoring client consumes
//! (components, references, nodes, views, default home) and the composite
//! conveniences that bundle component + reference + node creation into one
//! call.
//!
//! [`Mutation`] is the serializable form of those operations: validated
//! first, applied second, never partially. [`EditSession`] applies
//! mutations optimistically to a local copy and tracks them as pending
//! until the persistence layer confirms; on conflicting server state the
//! session rebases and replays, dropping mutations that no longer apply.
//! Rollback beyond that is the caller's responsibility; the core never
//! undoes anything on its own.

pub mod mutations;
pub mod session;
pub mod site;

pub use mutations::{Mutation, MutationResult};
pub use session::{EditSession, PendingMutation};
pub use site::{Site, SiteConfig, SiteError, SiteResult, ViewFields};
