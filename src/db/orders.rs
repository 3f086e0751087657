use sqlx::SqlitePool;

use crate::{
    db::{clients, services, PartialUpdate},
    errors::AppError,
    structs::{Order, OrderStatus},
};

pub struct NewOrder {
    pub client_id: i64,
    pub service_id: i64,
    pub status: OrderStatus,
    pub value: f64,
}

#[derive(Default)]
pub struct OrderChanges {
    pub client_id: Option<i64>,
    pub service_id: Option<i64>,
    pub status: Option<OrderStatus>,
    pub value: Option<f64>,
}

/// Client and service must belong to the same company as the order.
async fn check_references(
    pool: &SqlitePool,
    company_id: i64,
    client_id: Option<i64>,
    service_id: Option<i64>,
) -> Result<(), AppError> {
    if let Some(client_id) = client_id {
        if !clients::exists(pool, client_id, company_id).await? {
            return Err(AppError::NotFound("Client not found".to_owned()));
        }
    }
    if let Some(service_id) = service_id {
        if !services::exists(pool, service_id, company_id).await? {
            return Err(AppError::NotFound("Service not found".to_owned()));
        }
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, company_id: i64, order: NewOrder) -> Result<i64, AppError> {
    check_references(pool, company_id, Some(order.client_id), Some(order.service_id)).await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (client_id, service_id, status, value, company_id) VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(order.client_id)
    .bind(order.service_id)
    .bind(order.status)
    .bind(order.value)
    .bind(company_id)
    .fetch_one(pool)
    .await?;
    log::info!("Order {} created for company {}", id, company_id);
    Ok(id)
}

pub async fn list(pool: &SqlitePool, company_id: i64) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"
        SELECT o.id, o.client_id, c.name AS client_name, o.service_id, s.name AS service_name,
               o.status, o.value, o.company_id
        FROM orders AS o
        JOIN clients AS c ON o.client_id = c.id
        JOIN services AS s ON o.service_id = s.id
        WHERE o.company_id = $1
        ORDER BY o.id
        "#,
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    company_id: i64,
    changes: OrderChanges,
) -> Result<u64, AppError> {
    let mut update = PartialUpdate::new("orders");
    update
        .set("client_id", changes.client_id)
        .set("service_id", changes.service_id)
        .set("status", changes.status)
        .set("value", changes.value);
    if update.is_empty() {
        return Err(AppError::Validation("No data to update was provided".to_owned()));
    }
    check_references(pool, company_id, changes.client_id, changes.service_id).await?;
    Ok(update.execute_scoped(pool, id, company_id).await?)
}
