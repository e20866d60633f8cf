pub mod task;
pub mod user;

pub use task::{DeadlineUpdate, StatusUpdate, Task, TaskInput, TaskKey, TaskLookup, TaskUpdate};
pub use user::User;
