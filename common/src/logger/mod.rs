mod init;
mod spans;
mod trace_id;

pub use init::{LogFormat, init_logger};
pub use spans::{child_span, task_span, warn_if_slow};
pub use trace_id::TraceId;
