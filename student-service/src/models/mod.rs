pub mod student;

pub use student::{Address, Student, StudentChanges, StudentFilter};
