//! Command line front end for the `ss_*` collision data crates.

pub mod commands;
