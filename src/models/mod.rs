// src/models/mod.rs

pub mod question;
pub mod student;
pub mod teacher;
pub mod test_result;
