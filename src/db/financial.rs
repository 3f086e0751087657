use std::collections::BTreeMap;

use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    db::PartialUpdate,
    errors::AppError,
    structs::{FinancialRecord, MonthlyTotals},
};

/// Entries and exits share one row shape and differ only by table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialKind {
    Entry,
    Exit,
}

impl FinancialKind {
    pub fn table(self) -> &'static str {
        match self {
            FinancialKind::Entry => "financial_entries",
            FinancialKind::Exit => "financial_exits",
        }
    }

    /// Human-readable name used in response messages.
    pub fn label(self) -> &'static str {
        match self {
            FinancialKind::Entry => "Financial entry",
            FinancialKind::Exit => "Financial exit",
        }
    }
}

pub struct NewRecord {
    pub description: String,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Default)]
pub struct RecordChanges {
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub value: Option<f64>,
}

pub async fn create(
    pool: &SqlitePool,
    kind: FinancialKind,
    company_id: i64,
    record: NewRecord,
) -> Result<i64, sqlx::Error> {
    let query = format!(
        "INSERT INTO {} (description, date, value, company_id) VALUES ($1, $2, $3, $4) RETURNING id",
        kind.table()
    );
    let id: i64 = sqlx::query_scalar(&query)
        .bind(record.description)
        .bind(record.date)
        .bind(record.value)
        .bind(company_id)
        .fetch_one(pool)
        .await?;
    log::info!("{} {} created for company {}", kind.label(), id, company_id);
    Ok(id)
}

/// Newest first. `month` is a `YYYY-MM` prefix filter.
pub async fn list(
    pool: &SqlitePool,
    kind: FinancialKind,
    company_id: i64,
    month: Option<&str>,
) -> Result<Vec<FinancialRecord>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT id, description, date, value, company_id FROM {} WHERE company_id = ",
        kind.table()
    ));
    query.push_bind(company_id);
    if let Some(month) = month {
        query.push(" AND substr(date, 1, 7) = ").push_bind(month.to_owned());
    }
    query.push(" ORDER BY date DESC, id DESC");
    query
        .build_query_as::<FinancialRecord>()
        .fetch_all(pool)
        .await
}

pub async fn update(
    pool: &SqlitePool,
    kind: FinancialKind,
    id: i64,
    company_id: i64,
    changes: RecordChanges,
) -> Result<u64, AppError> {
    let mut update = PartialUpdate::new(kind.table());
    update
        .set("description", changes.description)
        .set("date", changes.date)
        .set("value", changes.value);
    if update.is_empty() {
        return Err(AppError::Validation("No data to update was provided".to_owned()));
    }
    Ok(update.execute_scoped(pool, id, company_id).await?)
}

/// Sums by `YYYY-MM`, ascending.
pub fn monthly_totals(entries: &[FinancialRecord], exits: &[FinancialRecord]) -> Vec<MonthlyTotals> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for entry in entries {
        months.entry(entry.date.format("%Y-%m").to_string()).or_default().0 += entry.value;
    }
    for exit in exits {
        months.entry(exit.date.format("%Y-%m").to_string()).or_default().1 += exit.value;
    }
    months
        .into_iter()
        .map(|(month, (entries, exits))| MonthlyTotals {
            month,
            entries,
            exits,
        })
        .collect()
}

/// Checks a `YYYY-MM` month filter.
pub fn parse_month(month: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m").to_string())
        .map_err(|_| AppError::Validation("Month must be formatted as YYYY-MM".to_owned()))
}
