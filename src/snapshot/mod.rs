pub mod storage;
pub mod types;

pub use storage::{get_snapshot_path, load_snapshot, save_snapshot};
pub use types::{Counts, Snapshot};
