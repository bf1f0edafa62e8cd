//! Question-set configuration store integration.

mod client;
mod types;

pub use client::QuestionStore;
pub use types::{Question, QuestionStoreError};
