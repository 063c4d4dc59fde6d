//! Fetches GitHub Actions workflows and runs, reshapes them into tables and builds dashboard charts.
//!
//! The pipeline is strictly sequential and blocking:
//!
//! 1. [`github::Pages`] walks a paginated list endpoint by following `Link: rel="next"`.
//! 2. [`workflow::table`] concatenates the pages into typed records.
//! 3. [`workflow::format`] coerces timestamps, derives durations and projects fixed columns.
//! 4. [`chart`] turns the formatted tables into serializable chart specifications.
//!
//! [`dashboard::Dashboard::refresh`] runs one whole fetch-and-render cycle.

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod env;
pub mod error;
pub mod github;
pub mod workflow;

pub use config::{Config, Repository, RunLimit};
pub use error::{Error, Result};

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// use actions_monitor::static_lazy_lock;
/// use std::sync::LazyLock;
///
/// static_lazy_lock!{
///     pub VAR_1: String = String::from("a static variable");
/// }
/// // ...equals to...
/// pub static VAR_2: LazyLock<String> = LazyLock::new(|| String::from("a static variable"));
/// ```
#[macro_export]
macro_rules! static_lazy_lock {
    ($(#[$meta:meta])* $vis:vis $name:ident: $type:ty = $expr:expr $(;)?) => {
        $(#[$meta])*
        $vis static $name: $crate::__priv_macro_use::LazyLock<$type> =
            $crate::__priv_macro_use::LazyLock::new(|| $expr);
    };
}

#[doc(hidden)]
pub mod __priv_macro_use {
    pub use std::sync::LazyLock;
}
