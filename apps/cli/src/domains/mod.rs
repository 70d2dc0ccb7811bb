pub mod favorites;
pub mod search;
pub mod watch;
