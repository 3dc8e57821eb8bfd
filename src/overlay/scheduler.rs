//! Coalescing frame scheduler
//!
//! Accepts any number of update requests between two frames, keeps only
//! the most recent value and asks the [`FrameClock`] for at most one frame.

use crate::host::{FrameClock, FrameId};

/// Latest-wins update slot flushed at most once per frame
#[derive(Debug)]
pub struct Coalescer<T> {
    latest: Option<T>,
    pending: Option<FrameId>,
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self {
            latest: None,
            pending: None,
        }
    }
}

impl<T> Coalescer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` as the next target. Requests a frame only if none is
    /// already pending; otherwise the pending target is replaced.
    pub fn request(&mut self, value: T, clock: &dyn FrameClock) {
        self.latest = Some(value);
        if self.pending.is_none() {
            self.pending = Some(clock.request_frame());
        }
    }

    /// Take the target if `frame` is the one this slot is waiting for
    pub fn take(&mut self, frame: FrameId) -> Option<T> {
        if self.pending != Some(frame) {
            return None;
        }
        self.pending = None;
        self.latest.take()
    }

    /// Drop the target and cancel the pending frame, if any
    pub fn cancel(&mut self, clock: &dyn FrameClock) {
        if let Some(frame) = self.pending.take() {
            clock.cancel_frame(frame);
        }
        self.latest = None;
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::headless::HeadlessHost;

    #[test]
    fn test_requests_coalesce_into_one_frame() {
        let host = HeadlessHost::new();
        let mut slot = Coalescer::new();

        slot.request(1, &host);
        slot.request(2, &host);
        slot.request(3, &host);

        assert_eq!(host.pending_frames().len(), 1);
        let frame = slot.pending_frame().unwrap();
        assert_eq!(slot.take(frame), Some(3));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_foreign_frame_is_ignored() {
        let host = HeadlessHost::new();
        let mut slot = Coalescer::new();
        slot.request("a", &host);

        assert_eq!(slot.take(FrameId(9_999)), None);
        assert!(slot.is_pending());
    }

    #[test]
    fn test_cancel_releases_frame() {
        let host = HeadlessHost::new();
        let mut slot = Coalescer::new();
        slot.request(10, &host);
        let frame = slot.pending_frame().unwrap();

        slot.cancel(&host);

        assert!(host.pending_frames().is_empty());
        assert_eq!(slot.take(frame), None);
    }

    #[test]
    fn test_new_frame_after_flush() {
        let host = HeadlessHost::new();
        let mut slot = Coalescer::new();
        slot.request(1, &host);
        let first = slot.pending_frame().unwrap();
        slot.take(first);

        slot.request(2, &host);
        let second = slot.pending_frame().unwrap();
        assert_ne!(first, second);
        assert_eq!(slot.take(second), Some(2));
    }
}
