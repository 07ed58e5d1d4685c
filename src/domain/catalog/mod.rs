//! Catalog module - courses and their lectures.

mod course;
mod lecture;

pub use course::{Course, MINOR_UNITS_PER_MAJOR};
pub use lecture::Lecture;
