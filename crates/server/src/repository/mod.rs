mod course_repository;
mod error;
mod exam_repository;
mod professor_repository;

pub use course_repository::{CourseRecord, CourseRepository, NewCourse, SeaOrmCourseRepository};
pub use error::{Result, StoreError};
pub use exam_repository::{ExamRecord, ExamRepository, NewExam, OwnedExam, SeaOrmExamRepository};
pub use professor_repository::{
    NewProfessor, ProfessorRecord, ProfessorRepository, SeaOrmProfessorRepository,
};
