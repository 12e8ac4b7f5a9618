//! # Quill Shared
//!
//! Wire types shared between the API server and its clients: request and
//! response DTOs plus the standard response envelope.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
