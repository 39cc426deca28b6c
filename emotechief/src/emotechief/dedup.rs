//! Bounded memory of recently seen redemption ids.

use std::collections::{HashSet, VecDeque};

use tokio::sync::RwLock;

pub const REDEMPTION_CACHE_LIMIT: usize = 2000;

#[derive(Default)]
struct SeenIds {
    seen: HashSet<String>,
    order: VecDeque<String>,
}

pub struct RedemptionDedup {
    inner: RwLock<SeenIds>,
    limit: usize,
}

impl Default for RedemptionDedup {
    fn default() -> Self {
        Self::with_limit(REDEMPTION_CACHE_LIMIT)
    }
}

impl RedemptionDedup {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: RwLock::new(SeenIds::default()),
            limit: limit.max(1),
        }
    }

    /// Record `redemption_id`. Returns `false` if it was already seen.
    pub async fn remember(&self, redemption_id: &str) -> bool {
        let mut ids = self.inner.write().await;
        if !ids.seen.insert(redemption_id.to_string()) {
            return false;
        }
        ids.order.push_back(redemption_id.to_string());
        while ids.order.len() > self.limit {
            if let Some(oldest) = ids.order.pop_front() {
                ids.seen.remove(&oldest);
            }
        }
        true
    }
}
