pub(crate) mod response_common;
pub mod coverage;
pub mod map_server_ack;
pub mod task_ack;
pub mod task_info;
