use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// Short-lived read cache. Entries are keyed by the query key plus the time
/// bucket they were stored in, and are never served once older than the TTL.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<(K, i64), Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.max(Duration::from_secs(1)),
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn bucket(&self, at: DateTime<Utc>) -> i64 {
        at.timestamp().div_euclid(self.ttl.as_secs() as i64)
    }

    fn is_fresh(&self, inserted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - inserted_at).to_std() {
            Ok(age) => age < self.ttl,
            // inserted "after" now: clock went backwards, don't trust it
            Err(_) => false,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now()).await
    }

    pub async fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(&(key.clone(), self.bucket(now)))?;
        self.is_fresh(entry.inserted_at, now)
            .then(|| entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Utc::now()).await;
    }

    pub async fn insert_at(&self, key: K, value: V, now: DateTime<Utc>) {
        let bucket = self.bucket(now);
        let mut entries = self.entries.write().await;
        entries.retain(|(_, b), e| *b == bucket && self.is_fresh(e.inserted_at, now));
        entries.insert(
            (key, bucket),
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_hit_within_bucket() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_at("k", 1, at(120)).await;
        assert_eq!(cache.get_at(&"k", at(150)).await, Some(1));
        assert_eq!(cache.get_at(&"other", at(150)).await, None);
    }

    #[tokio::test]
    async fn test_miss_after_bucket_rolls_over() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_at("k", 1, at(170)).await;
        // 10s old but in the next bucket
        assert_eq!(cache.get_at(&"k", at(180)).await, None);
    }

    #[tokio::test]
    async fn test_stale_entries_evicted_on_insert() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_at("a", 1, at(0)).await;
        cache.insert_at("b", 2, at(61)).await;
        assert_eq!(cache.len().await, 1);

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
