//! Runtime harness to execute modules and supervise their consumers

mod heart;
mod module;
mod supervisor;

pub use heart::*;
pub use module::*;
pub use supervisor::*;
