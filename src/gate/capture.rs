//! Bounded request body capture.
//!
//! # Responsibilities
//! - Buffer the inbound body up to a byte ceiling
//! - Stop reading as soon as the ceiling is passed
//! - Hand back a body that still yields every byte read when capture aborts
//!
//! # Design Decisions
//! - A declared size above the ceiling rejects before any read
//! - Frames are counted as they arrive; nothing past the first
//!   overflowing frame is pulled from the client
//! - Trailers are not captured

use axum::body::{Body, HttpBody as _};
use bytes::{Bytes, BytesMut};
use futures_util::{stream, StreamExt};
use http_body_util::BodyExt;

/// Why a capture did not produce a buffer.
pub enum CaptureError {
    /// The body is larger than the limit.
    ///
    /// `body` replays the bytes already read followed by the unread
    /// remainder of the original stream.
    TooLarge { limit: usize, body: Body },
    /// The body stream failed.
    ///
    /// `body` replays the bytes read before the failure followed by
    /// whatever the original stream still yields.
    Read { error: axum::Error, body: Body },
}

impl std::fmt::Debug for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::TooLarge { limit, .. } => f
                .debug_struct("TooLarge")
                .field("limit", limit)
                .finish_non_exhaustive(),
            CaptureError::Read { error, .. } => f
                .debug_struct("Read")
                .field("error", error)
                .finish_non_exhaustive(),
        }
    }
}

/// Read `body` fully if it fits in `limit` bytes.
pub async fn capture(mut body: Body, limit: usize) -> Result<Bytes, CaptureError> {
    if exceeds(body.size_hint().lower(), limit) {
        return Err(CaptureError::TooLarge { limit, body });
    }

    let mut buffer = BytesMut::new();
    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                return Err(CaptureError::Read {
                    error,
                    body: replay(buffer.freeze(), body),
                });
            }
        };
        let Ok(data) = frame.into_data() else {
            continue;
        };

        buffer.extend_from_slice(&data);
        if buffer.len() > limit {
            return Err(CaptureError::TooLarge {
                limit,
                body: replay(buffer.freeze(), body),
            });
        }
    }

    Ok(buffer.freeze())
}

fn exceeds(len: u64, limit: usize) -> bool {
    usize::try_from(len).map_or(true, |len| len > limit)
}

/// Body yielding `prefix` and then whatever is left in `rest`.
fn replay(prefix: Bytes, rest: Body) -> Body {
    let head = stream::once(async move { Ok::<_, axum::Error>(prefix) });
    Body::from_stream(head.chain(rest.into_data_stream()))
}
