//! SQLite implementation of the SubscriptionStore.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::PushSubscription;
use crate::domain::ports::SubscriptionStore;

pub struct SqliteSubscriptionStore {
    pool: SqlitePool,
}

impl SqliteSubscriptionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    endpoint: String,
    p256dh: String,
    auth: String,
}

impl From<SubscriptionRow> for PushSubscription {
    fn from(row: SubscriptionRow) -> Self {
        Self::new(row.endpoint, row.p256dh, row.auth)
    }
}

#[async_trait]
impl SubscriptionStore for SqliteSubscriptionStore {
    async fn list(&self) -> DomainResult<Vec<PushSubscription>> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            "SELECT endpoint, p256dh, auth FROM push_subscriptions ORDER BY created_at, key"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PushSubscription::from).collect())
    }

    async fn upsert(&self, subscription: &PushSubscription) -> DomainResult<String> {
        subscription.validate()?;
        let key = subscription.storage_key();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO push_subscriptions (key, endpoint, p256dh, auth, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET
                   p256dh = excluded.p256dh,
                   auth = excluded.auth,
                   updated_at = excluded.updated_at"#
        )
        .bind(&key)
        .bind(&subscription.endpoint)
        .bind(&subscription.keys.p256dh)
        .bind(&subscription.keys.auth)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(key)
    }

    async fn remove(&self, key: &str) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM push_subscriptions WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    async fn store() -> SqliteSubscriptionStore {
        SqliteSubscriptionStore::new(create_migrated_test_pool().await.unwrap())
    }

    #[tokio::test]
    async fn test_upsert_and_list() {
        let store = store().await;
        let a = PushSubscription::new("https://push.example/a", "pa", "aa");
        let b = PushSubscription::new("https://push.example/b", "pb", "ab");

        assert_eq!(store.upsert(&a).await.unwrap(), a.storage_key());
        store.upsert(&b).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&a));
        assert!(listed.contains(&b));
    }

    #[tokio::test]
    async fn test_upsert_same_endpoint_replaces_keys() {
        let store = store().await;
        store
            .upsert(&PushSubscription::new("https://push.example/a", "old", "old"))
            .await
            .unwrap();
        store
            .upsert(&PushSubscription::new("https://push.example/a", "new", "new"))
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed, vec![PushSubscription::new("https://push.example/a", "new", "new")]);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = store().await;
        let a = PushSubscription::new("https://push.example/a", "pa", "aa");
        store.upsert(&a).await.unwrap();

        assert!(store.remove(&a.storage_key()).await.unwrap());
        assert!(!store.remove(&a.storage_key()).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_rejects_invalid() {
        let store = store().await;
        let invalid = PushSubscription::new("", "p", "a");
        assert!(store.upsert(&invalid).await.is_err());
    }
}
