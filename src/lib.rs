// lib.rs

//! The elements that drive the `rincron` binary: a daemon that watches files and directories
//! for inotify events and spawns commands, under a target user, in response.

#![warn(
    explicit_outlives_requirements,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_crate_level_docs,
    missing_docs,
    private_doc_tests,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_lifetimes,
    variant_size_differences,
    clippy::cargo,
    clippy::pedantic
)]

pub mod clock;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod event;
pub mod loader;
pub mod logging;
pub mod reregister;
pub mod rule;
pub mod spawn;
pub mod syslog_sink;
pub mod taxonomy;
pub mod template;
pub mod watch;

#[cfg(test)]
pub(crate) mod test;
