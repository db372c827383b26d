//! Bridge between the immediate-mode UI thread and the async backend worker.

pub mod commands;
pub mod worker;
