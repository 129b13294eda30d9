#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod bench;
pub mod client;
pub mod config;
pub mod report;
pub mod utils;

#[cfg(test)]
mod test;
