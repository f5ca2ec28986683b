use datachat_transport::Attachment;

/// What the user is composing: the input box and the picked file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub(crate) query: String,
    pub(crate) attachment: Option<Attachment>,
}

impl Draft {
    /// Returns the typed query.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the picked file.
    #[inline]
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Returns the hint to show in an empty input box.
    #[inline]
    pub fn placeholder(&self) -> &'static str {
        if self.attachment.is_some() {
            "Describe your upload..."
        } else {
            "Ask a question..."
        }
    }

    #[inline]
    pub(crate) fn take(&mut self) -> Draft {
        std::mem::take(self)
    }
}
