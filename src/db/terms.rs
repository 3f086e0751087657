use chrono::Utc;
use sqlx::SqlitePool;

use crate::structs::Terms;

pub enum TermsSaved {
    Created(i64),
    Updated,
}

pub async fn get(pool: &SqlitePool, company_id: i64) -> Result<Option<Terms>, sqlx::Error> {
    sqlx::query_as::<_, Terms>("SELECT content, last_updated FROM terms WHERE company_id = $1")
        .bind(company_id)
        .fetch_optional(pool)
        .await
}

/// One row per company: inserts the first time, updates afterwards.
pub async fn upsert(pool: &SqlitePool, company_id: i64, content: &str) -> Result<TermsSaved, sqlx::Error> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM terms WHERE company_id = $1")
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?;

    let saved = match existing {
        Some(_) => {
            sqlx::query("UPDATE terms SET content = $1, last_updated = $2 WHERE company_id = $3")
                .bind(content)
                .bind(now)
                .bind(company_id)
                .execute(&mut *tx)
                .await?;
            TermsSaved::Updated
        }
        None => {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO terms (content, company_id, last_updated) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(content)
            .bind(company_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            TermsSaved::Created(id)
        }
    };

    tx.commit().await?;
    log::info!("Terms saved for company {}", company_id);
    Ok(saved)
}
