#![forbid(unsafe_code)]

pub mod error;
pub mod vocab_service;

pub use vocab_core::Clock;

pub use error::VocabError;
pub use vocab_service::VocabService;
