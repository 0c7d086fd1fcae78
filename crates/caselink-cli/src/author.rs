//! Author identity resolution for commands that write attachments.
//!
//! The resolution chain: `--user` flag > `CASELINK_USER` env > config `[author]` > `USER` env.

use caselink_core::config::AuthorConfig;
use caselink_core::model::UserProfile;
use std::env;

/// Errors from author resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorResolutionError {
    pub message: String,
}

impl std::fmt::Display for AuthorResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AuthorResolutionError {}

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

fn resolve_username_with(
    cli_flag: Option<&str>,
    configured: Option<&str>,
    env: &dyn EnvReader,
) -> Option<String> {
    if let Some(user) = cli_flag.filter(|u| !u.is_empty()) {
        return Some(user.to_string());
    }

    if let Some(val) = env.get("CASELINK_USER") {
        return Some(val);
    }

    if let Some(user) = configured.filter(|u| !u.is_empty()) {
        return Some(user.to_string());
    }

    env.get("USER")
}

fn resolve_author_with(
    cli_flag: Option<&str>,
    author: &AuthorConfig,
    env: &dyn EnvReader,
) -> Result<UserProfile, AuthorResolutionError> {
    let username = resolve_username_with(cli_flag, author.username.as_deref(), env).ok_or_else(
        || AuthorResolutionError {
            message: "no author identity; pass --user or set CASELINK_USER".to_string(),
        },
    )?;

    Ok(UserProfile {
        username,
        full_name: author.full_name.clone(),
        email: author.email.clone(),
        profile_uid: None,
    })
}

/// Resolve the profile stamped as `created_by` on new attachments.
///
/// `full_name` and `email` always come from config; only the username
/// follows the override chain.
///
/// # Errors
///
/// Returns an error when no step of the chain yields a username.
pub fn require_author(
    cli_flag: Option<&str>,
    author: &AuthorConfig,
) -> Result<UserProfile, AuthorResolutionError> {
    resolve_author_with(cli_flag, author, &RealEnv)
}
