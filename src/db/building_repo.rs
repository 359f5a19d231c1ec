// src/db/building_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::building::Building};

const BUILDING_COLUMNS: &str = r#"
    id, name, address, contact_name, contact_email, contact_phone,
    active, created_at, updated_at
"#;

#[derive(Clone)]
pub struct BuildingRepository {
    pool: PgPool,
}

impl BuildingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        address: Option<&str>,
        contact_name: Option<&str>,
        contact_email: Option<&str>,
        contact_phone: Option<&str>,
    ) -> Result<Building, AppError> {
        let query = format!(
            r#"
            INSERT INTO buildings (name, address, contact_name, contact_email, contact_phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {BUILDING_COLUMNS}
            "#
        );
        let building = sqlx::query_as::<_, Building>(&query)
            .bind(name)
            .bind(address)
            .bind(contact_name)
            .bind(contact_email)
            .bind(contact_phone)
            .fetch_one(&self.pool)
            .await?;
        Ok(building)
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<Building>, AppError> {
        let query = format!(
            r#"
            SELECT {BUILDING_COLUMNS}
            FROM buildings
            WHERE active = TRUE OR $1
            ORDER BY name ASC
            "#
        );
        let buildings = sqlx::query_as::<_, Building>(&query)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        Ok(buildings)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        address: Option<&str>,
        contact_name: Option<&str>,
        contact_email: Option<&str>,
        contact_phone: Option<&str>,
    ) -> Result<Building, AppError> {
        let query = format!(
            r#"
            UPDATE buildings
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                contact_name = COALESCE($4, contact_name),
                contact_email = COALESCE($5, contact_email),
                contact_phone = COALESCE($6, contact_phone),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BUILDING_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Building>(&query)
            .bind(id)
            .bind(name)
            .bind(address)
            .bind(contact_name)
            .bind(contact_email)
            .bind(contact_phone)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Desativação suave: o edifício sai das listagens mas o histórico
    /// de assistências continua a apontar para ele.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE buildings SET active = FALSE, updated_at = NOW() WHERE id = $1",
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
