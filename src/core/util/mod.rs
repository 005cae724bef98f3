//! Small internal utilities shared by the core and the CLI driver.

pub mod thread_pool;
