//! Cancellation utilities
//!
//! Provides first-class cancellation handles for streams and long-running
//! operations (SPEC_FULL §5).

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    /// Request cancellation. Any wrapped streams/futures observing this
    /// handle will stop as soon as possible. Dropping the cancelled stream
    /// closes the underlying HTTP connection so providers stop generating
    /// tokens.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Make any stream cancellable and return its cancel handle.
pub fn make_cancellable_stream<S, T>(stream: S) -> (impl futures::Stream<Item = T>, CancelHandle)
where
    S: futures::Stream<Item = T>,
{
    let flag = Arc::new(AtomicBool::new(false));
    let handle = CancelHandle::new(flag.clone());
    let wrapped_flag = flag.clone();
    let s = async_stream::stream! {
        use futures::StreamExt;
        futures::pin_mut!(stream);
        while let Some(item) = stream.next().await {
            if wrapped_flag.load(Ordering::SeqCst) { break; }
            yield item;
        }
    };
    (s, handle)
}

/// Create a standalone cancel handle shared across an orchestrator's
/// fanned-out agent tasks (SPEC_FULL §5).
pub fn new_cancel_handle() -> CancelHandle {
    CancelHandle::new(Arc::new(AtomicBool::new(false)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn cancelling_stops_the_stream_early() {
        let (stream, handle) = make_cancellable_stream(futures::stream::iter(0..100));
        futures::pin_mut!(stream);
        let mut seen = Vec::new();
        while let Some(item) = stream.next().await {
            seen.push(item);
            if item == 2 {
                handle.cancel();
            }
        }
        assert!(seen.len() < 100);
    }

    #[test]
    fn fresh_handle_is_not_cancelled() {
        assert!(!new_cancel_handle().is_cancelled());
    }
}
