//! Security module for MINTnet.
//!
//! This module decides what a viewer gets to see:
//! - Viewer modes resolved from memberships
//! - Field-level redaction driven by visibility records
//! - Redaction across joined sub-entities
//!
//! # Security Model
//!
//! A [`Viewer`] carries only the identity asserted by the authentication
//! service. For every entity served, the viewer's [`ViewerMode`] towards that
//! entity is resolved; anonymous and plain authenticated viewers receive
//! filtered copies, team members and admins receive the originals.
//!
//! # Example
//!
//! ```ignore
//! use mintnet_core::security::{FieldFilter, ModeResolver, Viewer};
//!
//! let mode = ModeResolver::new(&storage).resolve(&viewer, doc.kind, doc.id)?;
//! let served = if mode.requires_filtering() {
//!     FieldFilter::filter_by_visibility(&doc, &visibility)?
//! } else {
//!     doc
//! };
//! ```

pub mod context;
pub mod error;
pub mod filter;
pub mod mode;
pub mod relation;

pub use context::Viewer;
pub use error::{SecurityError, SecurityResult};
pub use filter::FieldFilter;
pub use mode::{ModeResolver, RoleLookup, ViewerMode};
pub use relation::{MemberRow, MemberView, RelationFilter, Related};
