//! Shared types and the feed wire format for zibundle.
//!
//! This crate owns the vocabulary the rest of the workspace speaks:
//! [`DependencySpec`] (a requested `name@version` pair), [`Requirement`]
//! (an exact-version pin against a feed URL), the descriptor renderer that
//! turns a requirement list into a Zero-Install-style `<interface>`
//! document, and the opaque [`SelectionsDocument`] the external resolver
//! hands back.

pub mod feed;
pub mod selections;
pub mod types;

pub use feed::{FEED_XMLNS, Requirement, render_descriptor};
pub use selections::SelectionsDocument;
pub use types::{DependencySpec, SpecError};
