/// Singleton game-state storage backends.
pub mod state_store;
/// Storage abstraction layer shared by every backend.
pub mod storage;
