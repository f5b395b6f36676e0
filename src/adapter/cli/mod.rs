//! Command-line adapter.

pub mod command;
pub mod config;
pub mod opportunities;
pub mod output;
pub mod run;
pub mod scan;
pub mod settle;
pub mod sweep;
