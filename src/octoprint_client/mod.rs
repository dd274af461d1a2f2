mod api_types;
mod client;

pub use api_types::{CommandRequest, COMMAND_PATH, STATUS_PATH};
pub use client::OctoPrintClient;
