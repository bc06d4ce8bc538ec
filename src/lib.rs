//! dubsim - Dubbing worker callback simulator
//!
//! Replays the progress callbacks a media-dubbing worker sends to a
//! job-status API, one stage at a time, so the API side can be debugged
//! without running the real pipeline. This library provides:
//! - Pipeline stage names and callback payload models
//! - The fixed payload fixtures for every stage and both `done` formats
//! - A blocking HTTP client for the status and read-back endpoints
//! - Configuration resolution (rc file, environment, flags)
//! - Optional S3 upload of the test metadata document
//! - CLI parsing, sequential replay and result verification
//!
//! # Example
//!
//! ```no_run
//! use dubsim::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod fixtures;
pub mod models;
pub mod storage;
