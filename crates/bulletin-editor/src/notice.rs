use bulletin_doc::RequestId;
use strum::{Display, EnumString};

/// Notices buffered per subscriber before the oldest are dropped.
pub const NOTICE_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible outcome of one submission. Front ends render these as a
/// toast or status line; the controller never raises errors past them.
#[derive(Clone, Debug)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub request: RequestId,
}

impl Notice {
    pub(crate) fn info(request: RequestId, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            request,
        }
    }

    pub(crate) fn error(request: RequestId, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            request,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
