//! Mapping from HTTP status codes to fetch outcomes.

/// How a response status is treated by [`HttpClient`](super::HttpClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: the body is decoded as a JSON document.
    Success,
    /// 404: the provider has nothing for this request.
    NotFound,
    /// Anything else.
    Failure,
}

/// Classifies a response status code.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        404 => StatusClass::NotFound,
        _ => StatusClass::Failure,
    }
}
