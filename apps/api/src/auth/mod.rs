//! Authentication: password hashing, cookie sessions, and the flash channel.

pub mod flash;
pub mod password;
pub mod session;
