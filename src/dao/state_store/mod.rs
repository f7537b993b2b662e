#[cfg(feature = "http-store")]
pub mod http;
pub mod memory;

use futures::future::BoxFuture;

use crate::dao::storage::StorageResult;
use crate::state::game::{GameState, GameStatePatch};

/// Abstraction over the persistence collaborator holding the singleton
/// game-state record.
///
/// `update_state` applies a partial update and answers with the full record
/// as the store now holds it. Field-level semantics are last-write-wins:
/// the store does not merge concurrent writers.
pub trait StateStore: Send + Sync + std::fmt::Debug {
    fn fetch_state(&self) -> BoxFuture<'static, StorageResult<GameState>>;
    fn update_state(&self, patch: GameStatePatch) -> BoxFuture<'static, StorageResult<GameState>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
