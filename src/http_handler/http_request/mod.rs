use super::http_response::{coverage, map_server_ack, task_ack, task_info};

pub mod request_common;

pub mod coverage_get;
pub mod coverage_put;
pub mod coverage_store_put;
pub mod datastore_put;
pub mod feature_type_put;
pub mod layer_style_put;
pub mod task_commit_post;
pub mod task_info_get;
pub mod task_init_post;
pub mod task_remove_post;
pub mod task_upload_post;
pub mod workspace_delete;
pub mod workspace_post;
