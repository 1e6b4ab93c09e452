//! Employee model backing the reference grid.
//!
//! The grid endpoint itself reads rows through `PgGridSource`; these
//! operations cover the conventional row CRUD the admin UI performs
//! alongside it.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Employee record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub office: String,
    pub age: i32,
    pub start_date: NaiveDate,
    pub salary: f64,
}

/// Input for updating an employee. Absent fields keep their current
/// values.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub position: Option<String>,
    pub office: Option<String>,
    pub age: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub salary: Option<f64>,
}

impl Employee {
    /// Find an employee by ID.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, name, position, office, age, start_date, salary FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to load employee")?;

        Ok(employee)
    }

    /// Update an employee, returning the new row, or `None` if the ID
    /// does not exist.
    pub async fn update(pool: &PgPool, id: i64, input: UpdateEmployee) -> Result<Option<Self>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees SET
                name = COALESCE($2, name),
                position = COALESCE($3, position),
                office = COALESCE($4, office),
                age = COALESCE($5, age),
                start_date = COALESCE($6, start_date),
                salary = COALESCE($7, salary)
            WHERE id = $1
            RETURNING id, name, position, office, age, start_date, salary
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.position)
        .bind(&input.office)
        .bind(input.age)
        .bind(input.start_date)
        .bind(input.salary)
        .fetch_optional(pool)
        .await
        .context("failed to update employee")?;

        Ok(employee)
    }

    /// Delete an employee. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete employee")?;

        Ok(result.rows_affected() > 0)
    }
}
