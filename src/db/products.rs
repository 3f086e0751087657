use sqlx::SqlitePool;

use crate::{db::PartialUpdate, errors::AppError, structs::Product};

pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub stock: i64,
}

#[derive(Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

pub async fn create(pool: &SqlitePool, company_id: i64, product: NewProduct) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO products (name, category, price, stock, company_id) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(product.name)
    .bind(product.category)
    .bind(product.price)
    .bind(product.stock)
    .bind(company_id)
    .fetch_one(pool)
    .await?;
    log::info!("Product {} created for company {}", id, company_id);
    Ok(id)
}

pub async fn list(pool: &SqlitePool, company_id: i64) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "SELECT id, name, category, price, stock, company_id FROM products WHERE company_id = $1 ORDER BY id",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    company_id: i64,
    changes: ProductChanges,
) -> Result<u64, AppError> {
    let mut update = PartialUpdate::new("products");
    update
        .set("name", changes.name)
        .set("category", changes.category)
        .set("price", changes.price)
        .set("stock", changes.stock);
    if update.is_empty() {
        return Err(AppError::Validation("No data to update was provided".to_owned()));
    }
    Ok(update.execute_scoped(pool, id, company_id).await?)
}
