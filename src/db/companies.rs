use sqlx::SqlitePool;

use crate::{db::PartialUpdate, errors::AppError, structs::Company};

pub struct NewCompany {
    pub name: String,
    pub tax_id: String,
    pub email: String,
}

#[derive(Default)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub email: Option<String>,
}

/// Creates the company and its first user in one transaction, returning
/// `(company_id, user_id)`.
pub async fn register(
    pool: &SqlitePool,
    company: NewCompany,
    user_email: &str,
    pwd_hash: &str,
) -> Result<(i64, i64), AppError> {
    let mut tx = pool.begin().await?;

    let company_id: i64 =
        sqlx::query_scalar("INSERT INTO companies (name, tax_id, email) VALUES ($1, $2, $3) RETURNING id")
            .bind(&company.name)
            .bind(&company.tax_id)
            .bind(&company.email)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_db(e, "Company tax id or email already registered"))?;

    let user_id: i64 =
        sqlx::query_scalar("INSERT INTO users (email, pwd_hash, company_id) VALUES ($1, $2, $3) RETURNING id")
            .bind(user_email)
            .bind(pwd_hash)
            .bind(company_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_db(e, "User email already registered"))?;

    tx.commit().await?;
    log::info!("Company {} registered with user {}", company_id, user_id);
    Ok((company_id, user_id))
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT id, name, tax_id, email FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fails with a validation error when nothing was given to change.
pub async fn update(pool: &SqlitePool, id: i64, changes: CompanyChanges) -> Result<u64, AppError> {
    let mut update = PartialUpdate::new("companies");
    update
        .set("name", changes.name)
        .set("tax_id", changes.tax_id)
        .set("email", changes.email);
    if update.is_empty() {
        return Err(AppError::Validation("No data to update was provided".to_owned()));
    }
    update
        .execute_by_id(pool, id)
        .await
        .map_err(|e| AppError::from_db(e, "Company tax id or email already in use"))
}

/// Cascades to every row scoped to the company.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    log::info!("Company with id {} deleted", id);
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support;

    fn acme() -> NewCompany {
        NewCompany {
            name: "Acme".into(),
            tax_id: "12.345".into(),
            email: "acme@example.com".into(),
        }
    }

    #[actix_web::test]
    async fn failed_user_insert_leaves_no_orphan_company() {
        let pool = test_support::pool().await;
        register(&pool, acme(), "owner@example.com", "hash").await.unwrap();

        let second = NewCompany {
            name: "Other".into(),
            tax_id: "99.999".into(),
            email: "other@example.com".into(),
        };
        let err = register(&pool, second, "owner@example.com", "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[actix_web::test]
    async fn duplicate_tax_id_conflicts() {
        let pool = test_support::pool().await;
        register(&pool, acme(), "a@example.com", "hash").await.unwrap();
        let mut dup = acme();
        dup.email = "new@example.com".into();
        let err = register(&pool, dup, "b@example.com", "hash").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn update_requires_a_field() {
        let pool = test_support::pool().await;
        let (id, _) = register(&pool, acme(), "a@example.com", "hash").await.unwrap();
        let err = update(&pool, id, CompanyChanges::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let changed = update(
            &pool,
            id,
            CompanyChanges {
                name: Some("Acme Ltd".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(get(&pool, id).await.unwrap().unwrap().name, "Acme Ltd");
    }
}
