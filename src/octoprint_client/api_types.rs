use serde::Serialize;

/// Plugin status endpoint, relative to the server base URL.
pub const STATUS_PATH: &str = "/api/plugin/octofilament";

/// Host G-code dispatch endpoint.
pub const COMMAND_PATH: &str = "/api/printer/command";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CommandRequest<'a> {
    pub commands: &'a [String],
}
