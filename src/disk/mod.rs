pub mod block_device;
pub mod error;
pub mod file_disk;
pub mod types;

pub use block_device::BlockDevice;
pub use error::DiskError;
pub use file_disk::FileDisk;
pub use types::{Block, DiskStats, BLOCK_SIZE};
