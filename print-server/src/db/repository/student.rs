//! Class and Student Repository

use super::{RepoError, RepoResult, ensure_id};
use shared::models::{SchoolClass, Student};
use sqlx::SqlitePool;

pub(super) const STUDENT_COLUMNS: &str = "id, order_id, class_id, name, is_served, submitted_dark, submitted_light, collected_dark, collected_light, updated_at";

pub async fn find_class(pool: &SqlitePool, id: i64) -> RepoResult<Option<SchoolClass>> {
    let class = sqlx::query_as::<_, SchoolClass>(
        "SELECT id, order_id, name, student_count FROM school_class WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(class)
}

pub async fn insert_class(pool: &SqlitePool, mut class: SchoolClass) -> RepoResult<SchoolClass> {
    class.id = ensure_id(class.id);
    sqlx::query("INSERT INTO school_class (id, order_id, name, student_count) VALUES (?1, ?2, ?3, ?4)")
        .bind(class.id)
        .bind(class.order_id)
        .bind(&class.name)
        .bind(class.student_count)
        .execute(pool)
        .await?;
    Ok(class)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Student>> {
    let sql = format!("SELECT {STUDENT_COLUMNS} FROM student WHERE id = ?");
    let student = sqlx::query_as::<_, Student>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(student)
}

pub async fn insert(pool: &SqlitePool, mut student: Student) -> RepoResult<Student> {
    student.id = ensure_id(student.id);
    let sql = format!(
        "INSERT INTO student ({STUDENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
    );
    sqlx::query(&sql)
        .bind(student.id)
        .bind(student.order_id)
        .bind(student.class_id)
        .bind(&student.name)
        .bind(student.is_served)
        .bind(student.submitted_dark)
        .bind(student.submitted_light)
        .bind(student.collected_dark)
        .bind(student.collected_light)
        .bind(student.updated_at)
        .execute(pool)
        .await?;
    Ok(student)
}

pub async fn update_collected(
    pool: &SqlitePool,
    id: i64,
    collected_dark: i64,
    collected_light: i64,
    at: i64,
) -> RepoResult<Student> {
    let rows = sqlx::query(
        "UPDATE student SET collected_dark = ?1, collected_light = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(collected_dark)
    .bind(collected_light)
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Student {id}")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Student {id}")))
}
