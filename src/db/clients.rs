use sqlx::SqlitePool;

use crate::{db::PartialUpdate, errors::AppError, structs::Client};

const DUPLICATE_EMAIL: &str = "Client email already registered";

pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
}

#[derive(Default)]
pub struct ClientChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

pub async fn create(pool: &SqlitePool, company_id: i64, client: NewClient) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO clients (name, email, phone, city, company_id) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(client.name)
    .bind(client.email)
    .bind(client.phone)
    .bind(client.city)
    .bind(company_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_db(e, DUPLICATE_EMAIL))?;
    log::info!("Client {} created for company {}", id, company_id);
    Ok(id)
}

pub async fn list(pool: &SqlitePool, company_id: i64) -> Result<Vec<Client>, sqlx::Error> {
    sqlx::query_as::<_, Client>(
        "SELECT id, name, email, phone, city, company_id FROM clients WHERE company_id = $1 ORDER BY id",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &SqlitePool, company_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE company_id = $1")
        .bind(company_id)
        .fetch_one(pool)
        .await
}

pub async fn exists(pool: &SqlitePool, id: i64, company_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1 AND company_id = $2)")
        .bind(id)
        .bind(company_id)
        .fetch_one(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    company_id: i64,
    changes: ClientChanges,
) -> Result<u64, AppError> {
    let mut update = PartialUpdate::new("clients");
    update
        .set("name", changes.name)
        .set("email", changes.email)
        .set("phone", changes.phone)
        .set("city", changes.city);
    if update.is_empty() {
        return Err(AppError::Validation("No data to update was provided".to_owned()));
    }
    update
        .execute_scoped(pool, id, company_id)
        .await
        .map_err(|e| AppError::from_db(e, "Client email already in use"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn ana() -> NewClient {
        NewClient {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            phone: None,
            city: Some("Recife".into()),
        }
    }

    #[actix_web::test]
    async fn email_is_unique_within_a_company_only() {
        let pool = test_support::pool().await;
        let first = test_support::company(&pool, "c1").await;
        let second = test_support::company(&pool, "c2").await;

        create(&pool, first, ana()).await.unwrap();
        let err = create(&pool, first, ana()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        create(&pool, second, ana()).await.unwrap();
        assert_eq!(count(&pool, first).await.unwrap(), 1);
        assert_eq!(count(&pool, second).await.unwrap(), 1);
    }
}
