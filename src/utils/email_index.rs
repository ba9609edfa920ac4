//! In-memory index of registered employee emails.
//!
//! A cuckoo filter answers "definitely not registered" without touching the
//! database; a moka cache answers "definitely registered" for recently seen
//! addresses. Anything else falls through to the database, which stays the
//! authority (the unique key on `employees.email`).

use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;
use std::time::Duration;
use tracing::info;

const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMAIL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

static EMAIL_CACHE: Lazy<Cache<String, ()>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(50_000)
        .time_to_live(Duration::from_secs(86_400))
        .build()
});

#[inline]
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Filter lookup; a poisoned lock degrades to "might exist" so the DB decides.
fn might_exist(email: &str) -> bool {
    EMAIL_FILTER
        .read()
        .map(|f| f.contains(&email.to_string()))
        .unwrap_or(true)
}

fn insert_batch(emails: &[String]) {
    if let Ok(mut filter) = EMAIL_FILTER.write() {
        for email in emails {
            filter.add(email);
        }
    }
}

/// Records a newly registered email in both layers.
pub async fn mark_taken(email: &str) {
    let email = normalize(email);
    insert_batch(std::slice::from_ref(&email));
    EMAIL_CACHE.insert(email, ()).await;
}

/// Drops a released email from the positive cache. The filter keeps it, which
/// only costs one database lookup on the next check.
pub async fn forget(email: &str) {
    EMAIL_CACHE.invalidate(&normalize(email)).await;
}

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> Result<bool, sqlx::Error> {
    let email = normalize(email);

    // 1. cuckoo filter: fast negative
    if !might_exist(&email) {
        return Ok(true);
    }

    // 2. moka cache: fast positive
    if EMAIL_CACHE.contains_key(&email) {
        return Ok(false);
    }

    // 3. database
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await?;

    if exists {
        EMAIL_CACHE.insert(email, ()).await;
    }

    Ok(!exists)
}

/// Loads every registered email into the filter, streaming in batches.
pub async fn warmup(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT email FROM employees").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (email,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
        batch.push(normalize(&email));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    info!(total, "Email index warmup complete");
    Ok(())
}
