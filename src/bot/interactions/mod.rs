pub mod ids;
pub mod standup_forms;
