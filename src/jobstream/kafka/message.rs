/// A unit of work to publish: a routing key plus an opaque payload.
///
/// The key drives partition assignment (same key, same partition); the
/// payload is passed through to the broker untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub key: Vec<u8>,
    pub payload: Vec<u8>,
}

impl Job {
    pub fn new(key: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }
}

/// A job as delivered by the broker, with its partition coordinates.
///
/// Offsets increase monotonically within a partition; this layer passes them
/// through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedJob {
    pub payload: Vec<u8>,
    pub partition: i32,
    pub offset: i64,
}
