//! Conversation turns.

/// Who a turn belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person typing.
    User,
    /// The answering service.
    Assistant,
}

/// Whether a turn's text is settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurnStatus {
    /// The text will not change anymore.
    #[default]
    Final,
    /// An assistant turn waiting for the service to answer.
    Pending,
}

/// One entry of the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Turn {
    pub(crate) role: Role,
    pub(crate) text: String,
    pub(crate) status: TurnStatus,
    pub(crate) attachment: Option<String>,
    pub(crate) error: Option<String>,
}

impl Turn {
    pub(crate) fn user(text: String, attachment: Option<String>) -> Self {
        Self {
            role: Role::User,
            text,
            status: TurnStatus::Final,
            attachment,
            error: None,
        }
    }

    pub(crate) fn pending_assistant() -> Self {
        Self {
            role: Role::Assistant,
            text: String::new(),
            status: TurnStatus::Pending,
            attachment: None,
            error: None,
        }
    }

    /// Returns who the turn belongs to.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the stored text. Empty while the turn is pending.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the turn is settled.
    #[inline]
    pub fn status(&self) -> TurnStatus {
        self.status
    }

    /// Shorthand for `status() == TurnStatus::Pending`.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == TurnStatus::Pending
    }

    /// Returns the name of the file a user turn was sent with.
    #[inline]
    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    /// Returns why the request behind an assistant turn failed.
    ///
    /// A failed turn still has a displayable text (the fallback answer);
    /// this is the diagnostic detail behind it.
    #[inline]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
