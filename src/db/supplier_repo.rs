// src/db/supplier_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::supplier::Supplier};

const SUPPLIER_COLUMNS: &str = r#"
    id, name, email, phone, specialty, active, created_at, updated_at
"#;

#[derive(Clone)]
pub struct SupplierRepository {
    pool: PgPool,
}

impl SupplierRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let query = format!(
            r#"
            INSERT INTO suppliers (name, email, phone, specialty)
            VALUES ($1, $2, $3, $4)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );
        let supplier = sqlx::query_as::<_, Supplier>(&query)
            .bind(name)
            .bind(email)
            .bind(phone)
            .bind(specialty)
            .fetch_one(&self.pool)
            .await?;
        Ok(supplier)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Supplier>, AppError> {
        let query = format!(
            r#"
            SELECT {SUPPLIER_COLUMNS}
            FROM suppliers
            WHERE active = TRUE OR $1
            ORDER BY name ASC
            "#
        );
        let suppliers = sqlx::query_as::<_, Supplier>(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<Supplier, AppError> {
        let query = format!(
            r#"
            UPDATE suppliers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                specialty = COALESCE($5, specialty),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SUPPLIER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Supplier>(&query)
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(phone)
            .bind(specialty)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE suppliers SET active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
