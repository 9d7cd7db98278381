//! Periodic removal of expired operational data.

use crate::entity::{device_code, persisted_grant};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

/// Delete expired persisted grants and device codes. Returns the number of
/// removed rows.
#[tracing::instrument(skip(db))]
pub async fn remove_expired_grants(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let now = OffsetDateTime::now_utc();
    let grants = persisted_grant::Entity::delete_many()
        .filter(persisted_grant::Column::Expiration.lt(now))
        .exec(db)
        .await?
        .rows_affected;
    let codes = device_code::Entity::delete_many()
        .filter(device_code::Column::Expiration.lt(now))
        .exec(db)
        .await?
        .rows_affected;
    if grants + codes > 0 {
        tracing::info!(grants, device_codes = codes, "removed expired grants");
    }
    Ok(grants + codes)
}

pub fn spawn_cleanup_task(db: Arc<DatabaseConnection>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = remove_expired_grants(&db).await {
                tracing::warn!(error = %e, "token cleanup failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::migrate_all;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, PaginatorTrait};
    use time::Duration as TimeDuration;

    fn grant(key: &str, expiration: Option<OffsetDateTime>) -> persisted_grant::ActiveModel {
        persisted_grant::ActiveModel {
            key: Set(key.to_string()),
            grant_type: Set("refresh_token".to_string()),
            subject_id: Set(Some("alice".to_string())),
            client_id: Set("mvc".to_string()),
            data: Set("{}".to_string()),
            creation_time: Set(OffsetDateTime::now_utc() - TimeDuration::hours(2)),
            expiration: Set(expiration),
            consumed_time: Set(None),
        }
    }

    #[tokio::test]
    async fn removes_only_expired_rows() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migrate_all(&db).await.unwrap();
        let now = OffsetDateTime::now_utc();

        grant("expired", Some(now - TimeDuration::hours(1)))
            .insert(&db)
            .await
            .unwrap();
        grant("live", Some(now + TimeDuration::hours(1)))
            .insert(&db)
            .await
            .unwrap();
        grant("forever", None).insert(&db).await.unwrap();
        device_code::ActiveModel {
            user_code: Set("ABCD".to_string()),
            device_code: Set("dc-1".to_string()),
            subject_id: Set(None),
            client_id: Set("client".to_string()),
            data: Set("{}".to_string()),
            creation_time: Set(now - TimeDuration::hours(2)),
            expiration: Set(now - TimeDuration::minutes(30)),
        }
        .insert(&db)
        .await
        .unwrap();

        assert_eq!(remove_expired_grants(&db).await.unwrap(), 2);
        assert_eq!(persisted_grant::Entity::find().count(&db).await.unwrap(), 2);
        assert_eq!(device_code::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(remove_expired_grants(&db).await.unwrap(), 0);
    }
}
