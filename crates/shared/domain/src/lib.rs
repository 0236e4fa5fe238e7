//! # Domain Models
//!
//! Pure data types shared by every slice: configuration, table and role names,
//! record shapes, change events and evidence verdicts.
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

#[macro_use]
mod macros;

pub mod changes;
pub mod config;
pub mod constants;
pub mod evidence;
pub mod records;
pub mod registry;
pub mod roles;
