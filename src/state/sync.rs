use tokio::sync::{Mutex, broadcast};

use crate::dto::sse::ServerEvent;

/// Sync-specific sub-state carved out from [`AppState`](super::AppState).
///
/// Every accepted mutation of the singleton record is fanned out through
/// these hubs as a whole-state snapshot; subscribers never receive diffs.
pub struct SyncState {
    public: SyncHub,
    admin: AdminSyncState,
}

impl SyncState {
    /// Build the sync sub-tree with per-stream channel capacities.
    pub fn new(public_capacity: usize, admin_capacity: usize) -> Self {
        Self {
            public: SyncHub::new(public_capacity),
            admin: AdminSyncState::new(admin_capacity),
        }
    }

    /// Access the public hub used to fan out snapshots to player views.
    pub fn public(&self) -> &SyncHub {
        &self.public
    }

    /// Access the admin sync bundle containing both hub and token.
    pub fn admin(&self) -> &AdminSyncState {
        &self.admin
    }
}

/// State bundle holding the admin hub and its coordinating token.
pub struct AdminSyncState {
    hub: SyncHub,
    token: Mutex<Option<String>>,
}

impl AdminSyncState {
    fn new(capacity: usize) -> Self {
        Self {
            hub: SyncHub::new(capacity),
            token: Mutex::new(None),
        }
    }

    /// Borrow the hub used for admin-only events.
    pub fn hub(&self) -> &SyncHub {
        &self.hub
    }

    /// Borrow the token mutex that coordinates the single admin connection.
    pub fn token(&self) -> &Mutex<Option<String>> {
        &self.token
    }
}

/// Broadcast hub delivering snapshot events to every current subscriber.
///
/// Unsubscription is dropping the receiver; a subscriber that detaches while
/// a send is in flight may observe at most one stray event.
pub struct SyncHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SyncHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    ///
    /// Late subscribers see only the most recent state going forward; the
    /// initial snapshot comes from a separate fetch.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
