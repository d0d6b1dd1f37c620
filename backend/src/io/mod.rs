//! # IO Module
//!
//! Adapter between HTTP clients and the domain layer. Requests arrive as
//! the DTOs of the `shared` crate, are mapped to domain commands, and every
//! answer (including failures) leaves wrapped in an `ApiResponse` envelope.

pub mod rest;

pub use rest::*;
