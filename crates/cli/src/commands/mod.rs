pub mod build;
pub mod classify;
pub mod index;
pub mod report;
pub mod resolve;
