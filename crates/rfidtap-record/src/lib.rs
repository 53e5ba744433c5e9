mod naming;
mod reader;
mod writer;

pub use naming::{daily_base_name, log_file_name, next_available_path};
pub use reader::read_records;
pub use writer::{SessionLog, SessionLogError};
