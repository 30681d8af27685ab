pub mod course;
pub mod exam;
pub mod professor;
