use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Professor::Table)
                    .if_not_exists()
                    .col(pk_auto(Professor::Id))
                    .col(string_len(Professor::Username, 50).unique_key())
                    .col(string_len(Professor::Password, 255))
                    .col(string_len(Professor::Name, 200))
                    .col(string_len(Professor::Email, 255).unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(pk_auto(Course::Id))
                    .col(string_len(Course::Code, 64).unique_key())
                    .col(string_len(Course::Name, 200))
                    .col(integer(Course::ProfessorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-courses-professor_id")
                            .from(Course::Table, Course::ProfessorId)
                            .to(Professor::Table, Professor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Exam::Table)
                    .if_not_exists()
                    .col(pk_auto(Exam::Id))
                    .col(string_len(Exam::Name, 200))
                    .col(integer(Exam::CourseId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-exams-course_id")
                            .from(Exam::Table, Exam::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_professor_id")
                    .table(Course::Table)
                    .col(Course::ProfessorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exams_course_id")
                    .table(Exam::Table)
                    .col(Exam::CourseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Exam::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Professor::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Professor {
    Table,
    Id,
    Username,
    Password,
    Name,
    Email,
}

#[derive(DeriveIden)]
enum Course {
    Table,
    Id,
    Code,
    Name,
    ProfessorId,
}

#[derive(DeriveIden)]
enum Exam {
    Table,
    Id,
    Name,
    CourseId,
}
