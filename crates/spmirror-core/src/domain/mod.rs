//! Domain layer - validated types and errors

pub mod errors;
pub mod newtypes;

pub use errors::DomainError;
pub use newtypes::FolderPath;
