pub mod language;
pub mod service;
pub mod summary;
pub mod types;
pub mod validation;
