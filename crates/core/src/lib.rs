//! Digs core: session entities, storage and device identity

pub mod device;
pub mod error;
pub mod file_store;
pub mod session;
pub mod state_dir;
pub mod store;

pub use device::{DEFAULT_PLATFORM, DeviceToken, resolve_device_token};
pub use error::{CoreError, CoreResult};
pub use file_store::JsonFileStore;
pub use session::{SessionKey, SessionSnapshot, TokenPair};
pub use state_dir::StateDir;
pub use store::{MemoryStore, SessionStore};
