#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

mod progress_update;
