// ABOUTME: Storage operations for system settings
// ABOUTME: Database CRUD for administrator-overridable configuration

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use sysconf_storage::{is_unique_violation, StorageError};
use tracing::debug;

use crate::typed::TypedValue;
use crate::types::{BulkSettingUpdate, Setting, SettingCreateInput, SettingUpdateInput};

#[derive(Clone)]
pub struct SettingsStorage {
    pool: SqlitePool,
}

impl SettingsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a new setting. Keys are unique; the value is not checked
    /// against its type.
    pub async fn create(&self, input: SettingCreateInput) -> Result<Setting, StorageError> {
        if input.key.trim().is_empty() {
            return Err(StorageError::InvalidInput(
                "Setting key cannot be empty".to_string(),
            ));
        }

        let value_type = input.value_type.unwrap_or_default();
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, value_type, description, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.key)
        .bind(&input.value)
        .bind(value_type.as_str())
        .bind(&input.description)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                debug!("Created setting '{}' ({}) with ID {}", input.key, value_type, id);
                self.get_by_id(id)
                    .await?
                    .ok_or(StorageError::NotFound(input.key))
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::DuplicateKey(input.key)),
            Err(e) => Err(StorageError::Sqlx(e)),
        }
    }

    /// Get all settings ordered by key
    pub async fn list(&self) -> Result<Vec<Setting>, StorageError> {
        let rows = sqlx::query("SELECT * FROM system_settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(Self::row_to_setting).collect()
    }

    /// Get a single setting by key
    pub async fn get(&self, key: &str) -> Result<Option<Setting>, StorageError> {
        let row = sqlx::query("SELECT * FROM system_settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(Self::row_to_setting).transpose()
    }

    /// Get a single setting by its database ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Setting>, StorageError> {
        let row = sqlx::query("SELECT * FROM system_settings WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(Self::row_to_setting).transpose()
    }

    /// Decoded value of a setting. A missing setting and an absent value are both `None`.
    pub async fn get_typed(&self, key: &str) -> Result<Option<TypedValue>, StorageError> {
        match self.get(key).await? {
            Some(setting) => Ok(setting.typed_value()?),
            None => Ok(None),
        }
    }

    /// Apply the provided fields of `update` and refresh `updated_at`
    pub async fn update(
        &self,
        key: &str,
        update: SettingUpdateInput,
    ) -> Result<Setting, StorageError> {
        let existing = self
            .get(key)
            .await?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        let value = update.value.unwrap_or(existing.value);
        let value_type = update
            .value_type
            .map(|t| t.as_str().to_string())
            .unwrap_or(existing.value_type);
        let description = update.description.unwrap_or(existing.description);

        let result = sqlx::query(
            r#"
            UPDATE system_settings
            SET value = ?, value_type = ?, description = ?, updated_at = ?
            WHERE key = ?
            "#,
        )
        .bind(&value)
        .bind(&value_type)
        .bind(&description)
        .bind(Utc::now().to_rfc3339())
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(key.to_string()));
        }

        debug!("Updated setting '{}'", key);
        self.get(key)
            .await?
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    /// Replace only the value of a setting
    pub async fn set_value(&self, key: &str, value: Option<&str>) -> Result<Setting, StorageError> {
        self.update(
            key,
            SettingUpdateInput {
                value: Some(value.map(str::to_string)),
                ..Default::default()
            },
        )
        .await
    }

    /// Update the values of several settings in one transaction. Any unknown
    /// key rolls the whole batch back.
    pub async fn bulk_update(
        &self,
        updates: BulkSettingUpdate,
    ) -> Result<Vec<Setting>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;
        let now = Utc::now().to_rfc3339();

        for item in &updates.settings {
            let result = sqlx::query(
                "UPDATE system_settings
                 SET value = ?, updated_at = ?
                 WHERE key = ?",
            )
            .bind(&item.value)
            .bind(&now)
            .bind(&item.key)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls it back
                return Err(StorageError::NotFound(item.key.clone()));
            }
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;
        debug!("Bulk updated {} settings", updates.settings.len());

        let mut results = Vec::with_capacity(updates.settings.len());
        for item in &updates.settings {
            let setting = self
                .get(&item.key)
                .await?
                .ok_or_else(|| StorageError::NotFound(item.key.clone()))?;
            results.push(setting);
        }

        Ok(results)
    }

    /// Delete a setting by key
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM system_settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(key.to_string()));
        }

        debug!("Deleted setting '{}'", key);
        Ok(())
    }

    fn row_to_setting(row: &SqliteRow) -> Result<Setting, StorageError> {
        let updated_at_str: String = row.try_get("updated_at").map_err(StorageError::Sqlx)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|_| StorageError::Database("Invalid updated_at timestamp".to_string()))?
            .with_timezone(&Utc);

        Ok(Setting {
            id: row.try_get("id").map_err(StorageError::Sqlx)?,
            key: row.try_get("key").map_err(StorageError::Sqlx)?,
            value: row.try_get("value").map_err(StorageError::Sqlx)?,
            value_type: row.try_get("value_type").map_err(StorageError::Sqlx)?,
            description: row.try_get("description").map_err(StorageError::Sqlx)?,
            updated_at,
        })
    }
}
