use sqlx::SqlitePool;

use crate::{db::PartialUpdate, errors::AppError, structs::Service};

pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Default)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

pub async fn create(pool: &SqlitePool, company_id: i64, service: NewService) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO services (name, description, price, company_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(service.name)
    .bind(service.description)
    .bind(service.price)
    .bind(company_id)
    .fetch_one(pool)
    .await?;
    log::info!("Service {} created for company {}", id, company_id);
    Ok(id)
}

pub async fn list(pool: &SqlitePool, company_id: i64) -> Result<Vec<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>(
        "SELECT id, name, description, price, company_id FROM services WHERE company_id = $1 ORDER BY id",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn exists(pool: &SqlitePool, id: i64, company_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM services WHERE id = $1 AND company_id = $2)")
        .bind(id)
        .bind(company_id)
        .fetch_one(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    company_id: i64,
    changes: ServiceChanges,
) -> Result<u64, AppError> {
    let mut update = PartialUpdate::new("services");
    update
        .set("name", changes.name)
        .set("description", changes.description)
        .set("price", changes.price);
    if update.is_empty() {
        return Err(AppError::Validation("No data to update was provided".to_owned()));
    }
    Ok(update.execute_scoped(pool, id, company_id).await?)
}
