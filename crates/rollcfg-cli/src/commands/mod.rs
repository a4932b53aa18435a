//! Command implementations. Each module exposes an `execute` function taking
//! the parsed arguments.

pub mod resolve;
pub mod stages;

pub use resolve::execute as resolve_execute;
pub use stages::execute as stages_execute;
