use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, QueryOrder};
use std::sync::Arc;
use time::OffsetDateTime;

use super::{OptionStore, TrustedIp, TrustedIpStore};
use crate::entity::{settings_option, trusted_ip};
use crate::error::StoreError;

/// Option store backed by the `settings_option` table.
#[derive(Clone, Debug)]
pub struct DbOptionStore {
    db: Arc<DatabaseConnection>,
}

impl DbOptionStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OptionStore for DbOptionStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = settings_option::Entity::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await?;
        Ok(row.map(|m| m.value))
    }

    #[tracing::instrument(skip(self, value))]
    async fn update(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let current = settings_option::Entity::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await?;
        if current.is_some_and(|m| m.value == value) {
            return Ok(false);
        }

        let row = settings_option::ActiveModel {
            name: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value.to_string()),
            updated_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        };
        settings_option::Entity::insert(row)
            .on_conflict(
                OnConflict::column(settings_option::Column::Name)
                    .update_columns([
                        settings_option::Column::Value,
                        settings_option::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await?;
        Ok(true)
    }
}

/// Trusted-IP datastore backed by the `trusted_ip` table.
#[derive(Clone, Debug)]
pub struct DbTrustedIpStore {
    db: Arc<DatabaseConnection>,
}

impl DbTrustedIpStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TrustedIpStore for DbTrustedIpStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let row = trusted_ip::Entity::find_by_id(key.to_string())
            .one(self.db.as_ref())
            .await?;
        Ok(row.is_some())
    }

    #[tracing::instrument(skip(self, entry), fields(remote_addr = %entry.remote_addr))]
    async fn add(&self, key: &str, entry: &TrustedIp) -> Result<bool, StoreError> {
        let row = trusted_ip::ActiveModel {
            cache_key: ActiveValue::Set(key.to_string()),
            remote_addr: ActiveValue::Set(entry.remote_addr.clone()),
            cidr_range: ActiveValue::Set(i16::from(entry.cidr_range)),
            cidr_format: ActiveValue::Set(entry.cidr_format.clone()),
            added_at: ActiveValue::Set(entry.added_at),
        };
        trusted_ip::Entity::insert(row)
            .exec(self.db.as_ref())
            .await?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        trusted_ip::Entity::delete_by_id(key.to_string())
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<(String, TrustedIp)>, StoreError> {
        let rows = trusted_ip::Entity::find()
            .order_by_asc(trusted_ip::Column::AddedAt)
            .order_by_asc(trusted_ip::Column::CacheKey)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let Ok(cidr_range) = u8::try_from(row.cidr_range) else {
                    tracing::warn!(
                        name = "store.trusted_ip.bad_range",
                        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                        cache_key = %row.cache_key,
                        cidr_range = row.cidr_range,
                        message = "Skipping trusted IP row with out-of-range prefix"
                    );
                    return None;
                };
                let entry = TrustedIp {
                    remote_addr: row.remote_addr,
                    cidr_range,
                    cidr_format: row.cidr_format,
                    added_at: row.added_at,
                };
                Some((row.cache_key, entry))
            })
            .collect())
    }
}
