use http::StatusCode;

/// Result of a catalog operation.
///
/// The status code is authoritative, the payload is present when the
/// operation succeeded.
/// Operations reporting a `bool` also carry `Some(false)` for business
/// outcomes such as "absent" or "not allowed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEnvelope<T> {
    status: StatusCode,
    payload: Option<T>,
}

impl<T> ResourceEnvelope<T> {
    pub fn new(status: StatusCode, payload: Option<T>) -> Self {
        Self { status, payload }
    }

    /// An envelope without payload.
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}
