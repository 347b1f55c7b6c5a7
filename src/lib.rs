//! This library crate contains everything needed to replicate student records through a message broker.
//!
//! Submodules have been introduced to split responsibilities. Each module has a specific focus
//! and they together form a chain of dependencies from the low-level [`library`], over the student
//! specific [`domain`] logic, through the executable [`harness`], up to the high-level [`modules`](module)
//! which are exposed as commands by the binary.

#![deny(missing_docs)]

pub mod constants;
pub mod domain;
pub mod harness;
pub mod library;
pub mod module;
