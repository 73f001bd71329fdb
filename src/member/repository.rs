//! In-memory member store
//!
//! Shared by every request through `Arc<MemberRepository>`. All access goes
//! through one mutex so the id sequence and the map never drift apart.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Member;

#[derive(Debug, Default)]
struct Store {
    sequence: u64,
    members: BTreeMap<u64, Member>,
}

/// Process-wide member store, not persisted across restarts
#[derive(Debug, Default)]
pub struct MemberRepository {
    store: Mutex<Store>,
}

impl MemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new member under the next id and return it
    pub fn save(&self, username: impl Into<String>, age: u32) -> Member {
        let mut store = self.lock();
        store.sequence += 1;
        let member = Member {
            id: store.sequence,
            username: username.into(),
            age,
        };
        store.members.insert(member.id, member.clone());
        member
    }

    #[allow(dead_code)] // No route looks up a single member; used in tests
    pub fn find_by_id(&self, id: u64) -> Option<Member> {
        self.lock().members.get(&id).cloned()
    }

    /// Snapshot of all members in save order
    pub fn find_all(&self) -> Vec<Member> {
        self.lock().members.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().members.len()
    }

    #[allow(dead_code)] // Pairs with len() for clippy; used in tests
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every member and restart the id sequence
    #[allow(dead_code)] // Store reset between test cases, no HTTP route
    pub fn clear_store(&self) {
        let mut store = self.lock();
        store.members.clear();
        store.sequence = 0;
    }

    // No operation panics mid-update, so a poisoned guard is still consistent
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
