//! # Quill Core
//!
//! The domain layer of the Quill blogging platform.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod page;
pub mod ports;
pub mod render;

pub use error::DomainError;
pub use page::{Page, PageRequest};
