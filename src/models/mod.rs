// Core data models for dubsim
// Stage names and the JSON bodies exchanged with the job-status API

pub mod stage;
pub mod payload;

pub use stage::*;
pub use payload::*;
