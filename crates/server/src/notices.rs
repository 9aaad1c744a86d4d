use std::fmt;

/// Admin-facing message. `code` is shown in monospace between `lead` and
/// `tail`; all three are escaped when rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    pub lead: String,
    pub code: String,
    pub tail: String,
}

impl Message {
    pub fn with_code(
        lead: impl Into<String>,
        code: impl Into<String>,
        tail: impl Into<String>,
    ) -> Self {
        Message {
            lead: lead.into(),
            code: code.into(),
            tail: tail.into(),
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message {
            lead: s.to_string(),
            ..Message::default()
        }
    }
}

impl From<String> for Message {
    fn from(lead: String) -> Self {
        Message {
            lead,
            ..Message::default()
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.lead, self.code, self.tail)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: Message,
}

impl Notice {
    pub fn css_class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Info => "notice-info",
            NoticeLevel::Error => "notice-error",
        }
    }
}

/// Notices collected while handling one request.
#[derive(Clone, Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<Message>) {
        self.items.push(Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<Message>) {
        self.items.push(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        });
    }

    pub fn as_slice(&self) -> &[Notice] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter().filter(|n| n.level == NoticeLevel::Error)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter().filter(|n| n.level == NoticeLevel::Info)
    }
}
