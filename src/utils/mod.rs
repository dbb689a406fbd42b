pub mod attendance;
pub mod format;
pub mod time;
pub mod validation;
