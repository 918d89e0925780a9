//! Concrete search requests produced by a sampler

/// A request body built from a condition template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Identifier of the originating condition, if it has one
    pub condition_id: Option<i64>,

    /// Serialized, substituted JSON body
    pub body: Vec<u8>,
}

impl SearchRequest {
    /// Create a request
    pub fn new(condition_id: Option<i64>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            condition_id,
            body: body.into(),
        }
    }

    /// Body as UTF-8 text, lossily
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
