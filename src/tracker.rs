//! Client Activity Tracker
//!
//! Per-client sliding windows of recent request timestamps plus
//! per-(client, endpoint) error counters. Purely structural, no scoring.
//!
//! Concurrency: each client's window sits behind its own mutex inside an
//! outer read-write map, so mutations on one client are linearizable and
//! different clients never block each other. The map is capacity-bounded;
//! once it overflows, stale clients are swept and then the least recently
//! seen client is evicted, together with its error counters.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::constants::{self, WINDOW_SECONDS};

/// One client's recent activity
#[derive(Debug, Default)]
struct ClientState {
    /// Request timestamps, ascending, pruned to the trailing window
    window: VecDeque<f64>,
    /// Most recent recorded timestamp
    last_seen: f64,
}

/// Tracks request windows and error counters across all clients
pub struct ClientActivityTracker {
    clients: RwLock<HashMap<String, Arc<Mutex<ClientState>>>>,
    errors: Mutex<HashMap<(String, String), u64>>,
    total_recorded: AtomicU64,
    capacity: usize,
}

impl ClientActivityTracker {
    pub fn new() -> Self {
        Self::with_capacity(constants::get_max_tracked_clients())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            errors: Mutex::new(HashMap::new()),
            total_recorded: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Append a request timestamp to the client's window, prune everything
    /// outside `(timestamp - 60, timestamp]`, and return the window size.
    pub fn record(&self, client_id: &str, timestamp: f64) -> usize {
        let state = self.client_state(client_id, timestamp);
        let mut state = state.lock();

        state.window.push_back(timestamp);
        state.last_seen = timestamp;

        let cutoff = timestamp - WINDOW_SECONDS;
        while state.window.front().is_some_and(|&t| t <= cutoff) {
            state.window.pop_front();
        }

        self.total_recorded.fetch_add(1, Ordering::Relaxed);
        state.window.len()
    }

    /// Increment and return the error counter for a (client, endpoint) pair
    pub fn record_error(&self, client_id: &str, endpoint: &str) -> u64 {
        let mut errors = self.errors.lock();
        let count = errors
            .entry((client_id.to_string(), endpoint.to_string()))
            .or_insert(0);
        *count += 1;
        *count
    }

    pub fn error_count(&self, client_id: &str, endpoint: &str) -> u64 {
        self.errors
            .lock()
            .get(&(client_id.to_string(), endpoint.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Current window size for a client (0 if untracked)
    pub fn window_size(&self, client_id: &str) -> usize {
        self.clients
            .read()
            .get(client_id)
            .map(|state| state.lock().window.len())
            .unwrap_or(0)
    }

    /// Window contents for a client, ascending (test and diagnostics hook)
    pub fn window_snapshot(&self, client_id: &str) -> Vec<f64> {
        self.clients
            .read()
            .get(client_id)
            .map(|state| state.lock().window.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Clients whose most recent request falls within the last window span
    pub fn active_client_count(&self, now: f64) -> usize {
        let cutoff = now - WINDOW_SECONDS;
        self.clients
            .read()
            .values()
            .filter(|state| state.lock().last_seen > cutoff)
            .count()
    }

    /// Clients whose current window size exceeds the threshold
    pub fn high_activity_client_count(&self, threshold: usize) -> usize {
        self.clients
            .read()
            .values()
            .filter(|state| state.lock().window.len() > threshold)
            .count()
    }

    /// Number of distinct clients currently tracked
    pub fn tracked_client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Lifetime count of recorded requests
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded.load(Ordering::Relaxed)
    }

    /// Drop all windows and error counters
    pub fn reset(&self) {
        self.clients.write().clear();
        self.errors.lock().clear();
        self.total_recorded.store(0, Ordering::Relaxed);
    }

    /// Fetch or create the client's state handle.
    ///
    /// Fast path takes the read lock only; the write path also enforces the
    /// capacity bound.
    fn client_state(&self, client_id: &str, now: f64) -> Arc<Mutex<ClientState>> {
        if let Some(state) = self.clients.read().get(client_id) {
            return Arc::clone(state);
        }

        let mut clients = self.clients.write();
        if let Some(state) = clients.get(client_id) {
            return Arc::clone(state);
        }

        // seed last_seen so a brand-new client never looks like the LRU entry
        let state = Arc::new(Mutex::new(ClientState {
            window: VecDeque::new(),
            last_seen: now,
        }));
        clients.insert(client_id.to_string(), Arc::clone(&state));

        if clients.len() > self.capacity {
            let evicted = Self::evict(&mut clients, self.capacity, now);
            if !evicted.is_empty() {
                log::debug!("evicted {} stale tracked clients", evicted.len());
                let mut errors = self.errors.lock();
                errors.retain(|(client, _), _| !evicted.contains(client));
            }
        }

        state
    }

    /// Sweep clients with stale windows first, then least recently seen,
    /// until the map fits the capacity. Returns the evicted client ids.
    fn evict(
        clients: &mut HashMap<String, Arc<Mutex<ClientState>>>,
        capacity: usize,
        now: f64,
    ) -> Vec<String> {
        let cutoff = now - WINDOW_SECONDS;
        let mut stale: Vec<String> = clients
            .iter()
            .filter(|(_, state)| state.lock().last_seen <= cutoff)
            .map(|(id, _)| id.clone())
            .collect();

        let mut evicted = Vec::new();
        for id in stale.drain(..) {
            if clients.len() <= capacity {
                break;
            }
            clients.remove(&id);
            evicted.push(id);
        }

        while clients.len() > capacity {
            let oldest = clients
                .iter()
                .min_by(|(_, a), (_, b)| {
                    let a = a.lock().last_seen;
                    let b = b.lock().last_seen;
                    a.total_cmp(&b)
                })
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    clients.remove(&id);
                    evicted.push(id);
                }
                None => break,
            }
        }
        evicted
    }
}

impl Default for ClientActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_returns_window_size() {
        let tracker = ClientActivityTracker::with_capacity(100);
        assert_eq!(tracker.record("1.2.3.4", 1000.0), 1);
        assert_eq!(tracker.record("1.2.3.4", 1001.0), 2);
        assert_eq!(tracker.record("5.6.7.8", 1001.0), 1);
    }

    #[test]
    fn test_window_prunes_to_trailing_span() {
        let tracker = ClientActivityTracker::with_capacity(100);
        tracker.record("c", 100.0);
        tracker.record("c", 130.0);
        tracker.record("c", 160.0);
        // 100.0 == 160 - 60 sits outside the half-open window
        assert_eq!(tracker.window_snapshot("c"), vec![130.0, 160.0]);

        let size = tracker.record("c", 200.0);
        assert_eq!(size, 2);
        assert_eq!(tracker.window_snapshot("c"), vec![160.0, 200.0]);
    }

    #[test]
    fn test_window_invariant_ascending_within_bound() {
        let tracker = ClientActivityTracker::with_capacity(100);
        let last = 499.0;
        for i in 0..80 {
            tracker.record("c", 420.0 + i as f64);
        }
        let window = tracker.window_snapshot("c");
        assert!(window.windows(2).all(|w| w[0] <= w[1]));
        assert!(window.iter().all(|&t| t > last - WINDOW_SECONDS && t <= last));
    }

    #[test]
    fn test_error_counters_increment_per_pair() {
        let tracker = ClientActivityTracker::with_capacity(100);
        assert_eq!(tracker.record_error("c", "/login"), 1);
        assert_eq!(tracker.record_error("c", "/login"), 2);
        assert_eq!(tracker.record_error("c", "/admin"), 1);
        assert_eq!(tracker.error_count("c", "/login"), 2);
        assert_eq!(tracker.error_count("other", "/login"), 0);
    }

    #[test]
    fn test_active_and_high_activity_counts() {
        let tracker = ClientActivityTracker::with_capacity(100);
        tracker.record("old", 100.0);
        for i in 0..5 {
            tracker.record("busy", 190.0 + i as f64);
        }
        tracker.record("quiet", 195.0);

        assert_eq!(tracker.active_client_count(200.0), 2);
        assert_eq!(tracker.high_activity_client_count(3), 1);
        assert_eq!(tracker.high_activity_client_count(0), 3);
    }

    #[test]
    fn test_capacity_evicts_least_recently_seen() {
        let tracker = ClientActivityTracker::with_capacity(2);
        tracker.record("a", 100.0);
        tracker.record_error("a", "/x");
        tracker.record("b", 101.0);
        tracker.record("c", 102.0);

        assert_eq!(tracker.tracked_client_count(), 2);
        assert_eq!(tracker.window_size("a"), 0);
        assert_eq!(tracker.window_size("b"), 1);
        assert_eq!(tracker.window_size("c"), 1);
        // evicted client's error counters went with it
        assert_eq!(tracker.error_count("a", "/x"), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let tracker = ClientActivityTracker::with_capacity(100);
        tracker.record("a", 100.0);
        tracker.record_error("a", "/x");
        tracker.reset();

        assert_eq!(tracker.tracked_client_count(), 0);
        assert_eq!(tracker.error_count("a", "/x"), 0);
        assert_eq!(tracker.total_recorded(), 0);
    }

    #[test]
    fn test_concurrent_records_lose_no_updates() {
        let tracker = Arc::new(ClientActivityTracker::with_capacity(100));
        let mut handles = Vec::new();
        for t in 0..4 {
            let tracker = Arc::clone(&tracker);
            handles.push(std::thread::spawn(move || {
                for i in 0..250 {
                    tracker.record("shared", 1000.0 + (t * 250 + i) as f64 / 100.0);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // all 1000 timestamps fall inside one 60s span, none pruned
        assert_eq!(tracker.window_size("shared"), 1000);
        assert_eq!(tracker.total_recorded(), 1000);
    }
}
