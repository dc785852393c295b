pub mod employee;
pub mod item;
