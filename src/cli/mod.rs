pub mod commands;
pub mod error;
pub mod output;
pub mod simulate;
pub mod verify;

pub use commands::*;
pub use error::*;
