// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, bad configuration and failed callbacks.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code 2)
/// Internal errors are for unexpected system failures.
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// Error raised when one or more requests of a run failed
///
/// Carried through `anyhow` so `main` can map it to a user error.
#[derive(Debug, thiserror::Error)]
#[error("{failed} of {total} requests failed")]
pub struct RunFailed {
    pub failed: usize,
    pub total: usize,
}

/// Validate a job ID (non-empty, usable as a single path segment)
pub fn validate_job_id(job_id: &str) -> Result<(), String> {
    let trimmed = job_id.trim();
    if trimmed.is_empty() {
        return Err("Job ID cannot be empty".to_string());
    }
    if trimmed.contains(['/', '?', '#', '%']) || trimmed.contains(char::is_whitespace) {
        return Err(format!(
            "Invalid job ID: '{}'. Job IDs cannot contain '/', '?', '#', '%' or whitespace.",
            job_id
        ));
    }
    // Dot segments are collapsed by URL normalization and would hit another route
    if trimmed == "." || trimmed == ".." {
        return Err(format!("Invalid job ID: '{}'. Job IDs cannot be '.' or '..'.", job_id));
    }
    Ok(())
}

/// Validate a target language code (letters and hyphens, e.g. "en", "pt-BR")
pub fn validate_target_lang(lang: &str) -> Result<(), String> {
    if lang.len() >= 2 && lang.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        Ok(())
    } else {
        Err(format!(
            "Invalid target language: '{}'. Use a language code such as 'en' or 'pt-BR'.",
            lang
        ))
    }
}

/// Validate an API base URL
pub fn validate_base_url(url: &str) -> Result<(), String> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(host) if !host.trim_matches('/').is_empty() => Ok(()),
        _ => Err(format!(
            "Invalid base URL: '{}'. Expected http://host[:port] or https://host[:port].",
            url
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_job_id() {
        assert!(validate_job_id("67491d8e9f1234567890abcd").is_ok());
        assert!(validate_job_id("job-1").is_ok());
        assert!(validate_job_id("").is_err());
        assert!(validate_job_id("   ").is_err());
        assert!(validate_job_id("a/b").is_err());
        assert!(validate_job_id("a b").is_err());
        assert!(validate_job_id("a?b").is_err());
        assert!(validate_job_id(".").is_err());
        assert!(validate_job_id("..").is_err());
        assert!(validate_job_id(" .. ").is_err());
        assert!(validate_job_id("%2e%2e").is_err());
        assert!(validate_job_id("a%2Fb").is_err());
        assert!(validate_job_id("v1.2").is_ok());
        assert!(validate_job_id("...").is_ok());
    }

    #[test]
    fn test_validate_target_lang() {
        assert!(validate_target_lang("en").is_ok());
        assert!(validate_target_lang("pt-BR").is_ok());
        assert!(validate_target_lang("e").is_err());
        assert!(validate_target_lang("en_US").is_err());
        assert!(validate_target_lang("e1").is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("https://api.example.com/").is_ok());
        assert!(validate_base_url("localhost:8000").is_err());
        assert!(validate_base_url("http://").is_err());
        assert!(validate_base_url("ftp://host").is_err());
    }

    #[test]
    fn test_run_failed_message() {
        let err = RunFailed { failed: 2, total: 9 };
        assert_eq!(err.to_string(), "2 of 9 requests failed");
    }
}
