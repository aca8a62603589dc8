pub mod engine;
pub mod validation;
