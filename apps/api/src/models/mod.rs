pub mod catalog;
pub mod dev;
pub mod org;
pub mod position;
