//! # Trellis Router
//!
//! Maps request paths to views, and validates author-entered view paths
//! before any mutation touches the stores.
//!
//! Routing is exact-match only (tolerant of a single trailing slash); there
//! is no prefix or wildcard matching. The home request `/` walks a
//! three-tier fallback chain because the `is_home` flag and the site's
//! `default_home_node_id` pointer are maintained separately and can drift
//! apart between edits.

pub mod paths;
pub mod router;

pub use paths::{validate_view_path, PathError, RESERVED_PREFIXES};
pub use router::{collect_views, route, RouteError, ViewSummary};
