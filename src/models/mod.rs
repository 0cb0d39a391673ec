pub mod job;
pub mod speech;
pub mod summary;
pub mod translation;
