mod model;
mod poller;
mod source;

pub use model::{
    FilamentStatus, Icon, IndicatorColor, Presentation, StatusPayload, StatusSnapshot,
    PENDING_LABEL,
};
pub use poller::StatusPoller;
pub use source::StatusSource;
