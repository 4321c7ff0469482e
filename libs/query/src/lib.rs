pub mod decoder;
pub mod runner;

pub use decoder::{DecodeError, decode_row};
pub use runner::QueryRunner;
