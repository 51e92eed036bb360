pub mod lock;
pub mod retry;
pub mod task;
