//! Integration test suite modules

mod accounting;
mod config;
mod fork;
mod reporting_windows;
mod rollback;
mod universe_lifecycle;
