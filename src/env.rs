//! Defines the environment variables to use.
//!
//! Every variable is read once, on first access. Library code never reads these directly; they are
//! folded into an explicit [`Config`](crate::Config) by [`Config::from_env`](crate::Config::from_env).

#![cfg(feature = "env")]

use crate::{
    config::{DEFAULT_API_URL, DEFAULT_SERVER_URL},
    static_lazy_lock,
};

use std::env;

/// Parses an environment variable from [`String`] to something else, wrapping any error in [`anyhow::Error`].
#[macro_export]
macro_rules! parse_env {
    ($key:expr => |$var:ident| $expr:expr) => {
        std::env::var($key)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(|$var| $expr)
    };
    ($key:expr => |$var:ident| $expr:expr; anyhow) => {
        $crate::parse_env!($key => |$var| $expr.map_err(|e| anyhow::anyhow!(e)))
    };
}

pub use parse_env;

#[cfg(feature = "env_github_token")]
static_lazy_lock! {
    /// The GitHub token, if set.
    pub GITHUB_TOKEN: Option<String> = env::var("GITHUB_TOKEN").ok().filter(|token| !token.is_empty());
}

#[cfg(feature = "env_github_repository")]
static_lazy_lock! {
    /// The monitored repository in `owner/name` form, if set.
    pub GITHUB_REPOSITORY: Option<String> = env::var("GITHUB_REPOSITORY").ok().filter(|repo| !repo.is_empty());
}

static_lazy_lock! {
    /// The REST API root.
    pub GITHUB_API_URL: String = env::var("GITHUB_API_URL").unwrap_or_else(|_| String::from(DEFAULT_API_URL));
}

static_lazy_lock! {
    /// The web root.
    pub GITHUB_SERVER_URL: String = env::var("GITHUB_SERVER_URL").unwrap_or_else(|_| String::from(DEFAULT_SERVER_URL));
}

#[cfg(feature = "env_max_runs")]
static_lazy_lock! {
    /// The requested number of runs, unvalidated. `None` when unset.
    pub MAX_RUNS: Option<anyhow::Result<u32>> = match env::var("MAX_RUNS") {
        Err(env::VarError::NotPresent) => None,
        _ => Some(parse_env!("MAX_RUNS" => |s| s.trim().parse::<u32>(); anyhow)),
    };
}
