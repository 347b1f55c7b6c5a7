use crate::domain::{StudentAttributes, StudentIdentifier, StudentRecord};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{error::Error as SQLError, Executor, Row};

pub async fn setup_tables<'e, E>(con: E) -> Result<(), SQLError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(include_str!("sql/schema.sql"))
        .execute(con)
        .await?;

    Ok(())
}

pub async fn find_student<'e, E>(con: E, id: &str) -> Result<Option<StudentRecord>, SQLError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
            SELECT id, nim, name, email, address, created_at, updated_at, deleted_at
            FROM mahasiswa
            WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(con)
    .await?;

    row.as_ref().map(student_from_row).transpose()
}

pub async fn insert_student<'e, E>(con: E, record: &StudentRecord) -> Result<(), SQLError>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
            INSERT INTO mahasiswa ( id, nim, name, email, address, created_at, updated_at, deleted_at )
            VALUES ( $1, $2, $3, $4, $5, $6, $7, $8 )
        "#,
    )
    .bind(record.id.as_str())
    .bind(record.attributes.nim.as_deref())
    .bind(record.attributes.name.as_deref())
    .bind(record.attributes.email.as_deref())
    .bind(record.attributes.address.as_deref())
    .bind(record.created_at.to_rfc3339())
    .bind(record.updated_at.to_rfc3339())
    .bind(record.deleted_at.map(|t| t.to_rfc3339()))
    .execute(con)
    .await?;

    Ok(())
}

pub async fn update_student<'e, E>(con: E, record: &StudentRecord) -> Result<u64, SQLError>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(sqlx::query(
        r#"
            UPDATE mahasiswa
            SET nim = $2, name = $3, email = $4, address = $5, updated_at = $6, deleted_at = $7
            WHERE id = $1
        "#,
    )
    .bind(record.id.as_str())
    .bind(record.attributes.nim.as_deref())
    .bind(record.attributes.name.as_deref())
    .bind(record.attributes.email.as_deref())
    .bind(record.attributes.address.as_deref())
    .bind(record.updated_at.to_rfc3339())
    .bind(record.deleted_at.map(|t| t.to_rfc3339()))
    .execute(con)
    .await?
    .rows_affected())
}

pub async fn soft_delete_student<'e, E>(
    con: E,
    id: &str,
    at: DateTime<Utc>,
) -> Result<u64, SQLError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let at = at.to_rfc3339();

    Ok(sqlx::query(
        r#"
            UPDATE mahasiswa
            SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(at)
    .execute(con)
    .await?
    .rows_affected())
}

fn timestamp(row: &SqliteRow, column: &str) -> Result<Option<DateTime<Utc>>, SQLError> {
    let text: Option<String> = row.try_get(column)?;

    text.map(|text| {
        DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| SQLError::ColumnDecode {
                index: column.to_owned(),
                source: Box::new(e),
            })
    })
    .transpose()
}

fn required_timestamp(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, SQLError> {
    timestamp(row, column)?.ok_or_else(|| SQLError::ColumnDecode {
        index: column.to_owned(),
        source: "unexpected null timestamp".into(),
    })
}

fn student_from_row(row: &SqliteRow) -> Result<StudentRecord, SQLError> {
    let id: String = row.try_get("id")?;

    Ok(StudentRecord {
        id: StudentIdentifier::from(id),
        attributes: StudentAttributes {
            nim: row.try_get("nim")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
        },
        created_at: required_timestamp(row, "created_at")?,
        updated_at: required_timestamp(row, "updated_at")?,
        deleted_at: timestamp(row, "deleted_at")?,
    })
}
