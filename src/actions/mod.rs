//! Pipeline steps, grouped by the stage they belong to.

pub mod build;
pub mod message;
pub mod registration;
pub mod token;
pub mod validate;
