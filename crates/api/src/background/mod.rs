//! Background maintenance jobs.

pub mod retention;
