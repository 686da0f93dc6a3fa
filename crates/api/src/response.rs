use serde::Serialize;

/// Standard wrapper for successful data responses.
///
/// Data endpoints return their payload under a `data` key so clients can
/// distinguish a successful body from the error envelope at a glance.
/// Health endpoints return bare JSON and skip the wrapper.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
