pub mod locking;
pub mod run_dir;
pub mod status;

pub use locking::{LockHandle, SingletonLock};
pub use run_dir::RunDir;
pub use status::StatusStore;
