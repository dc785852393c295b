pub mod employee;
pub mod item;
pub mod system;
