use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub tax_id: String,
    pub email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub pwd_hash: String,
    pub company_id: i64,
    pub reset_token: Option<String>,
    pub reset_expires: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub company_id: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub company_id: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub company_id: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
pub enum OrderStatus {
    #[serde(alias = "Pendente")]
    Pending,
    #[serde(rename = "In Progress", alias = "Em Andamento")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    #[serde(alias = "Concluído")]
    Completed,
}

/// An order as listed, joined with its client and service names.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub service_id: i64,
    pub service_name: String,
    pub status: OrderStatus,
    pub value: f64,
    pub company_id: i64,
}

/// Row shape shared by `financial_entries` and `financial_exits`.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct FinancialRecord {
    pub id: i64,
    pub description: String,
    pub date: NaiveDate,
    pub value: f64,
    pub company_id: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct Terms {
    pub content: String,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    pub month: String,
    pub entries: f64,
    pub exits: f64,
}

#[derive(Serialize, Debug, Clone)]
pub struct DashboardSummary {
    pub total_entries: f64,
    pub total_exits: f64,
    pub balance: f64,
    pub entry_count: i64,
    pub exit_count: i64,
    pub client_count: i64,
    pub monthly: Vec<MonthlyTotals>,
}
