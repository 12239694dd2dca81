pub mod config;
pub mod init;
pub mod run;
pub mod schedule;
pub mod stale;
pub mod sweep;
