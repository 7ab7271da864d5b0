use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::enrollment::TwoFactor;

struct Entry {
	state: TwoFactor,
	changed_at: Instant,
}

/// Per-account two-factor state, kept for the lifetime of the process.
///
/// Pending enrollments expire after `pending_ttl`; expired ones read as
/// disabled and are pruned on the next write.
#[derive(Clone)]
pub struct EnrollmentStore {
	inner: Arc<RwLock<HashMap<String, Entry>>>,
	pending_ttl: Duration,
}

impl EnrollmentStore {
	pub fn new(pending_ttl: Duration) -> Self {
		Self { inner: Arc::new(RwLock::new(HashMap::new())), pending_ttl }
	}

	fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
		matches!(entry.state, TwoFactor::Pending { .. }) && now.duration_since(entry.changed_at) >= self.pending_ttl
	}

	pub async fn get(&self, account: &str) -> TwoFactor {
		let now = Instant::now();
		self.inner
			.read()
			.await
			.get(account)
			.filter(|e| !self.is_expired(e, now))
			.map(|e| e.state.clone())
			.unwrap_or_default()
	}

	/// Run `f` against the account's state under the write lock.
	/// Accounts that end up disabled are dropped from the map.
	pub async fn update<T>(&self, account: &str, f: impl FnOnce(&mut TwoFactor) -> T) -> T {
		let now = Instant::now();
		let mut guard = self.inner.write().await;
		guard.retain(|_, e| !self.is_expired(e, now));

		let (mut state, changed_at) = guard
			.remove(account)
			.map(|e| (e.state, e.changed_at))
			.unwrap_or((TwoFactor::Disabled, now));
		let before = state.clone();
		let out = f(&mut state);
		if state != TwoFactor::Disabled {
			let changed_at = if state == before { changed_at } else { now };
			guard.insert(account.to_string(), Entry { state, changed_at });
		}
		out
	}

	pub async fn len(&self) -> usize {
		self.inner.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}
