//! Cooperative frame scheduler.
//!
//! One frame callback is pending at a time. The loop is cancelled and
//! restarted whenever the dependency key changes (graph revision, view,
//! drag/hover state), and `stop` cancels it for unmount.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Frame callback source, e.g. `requestAnimationFrame`.
pub trait FrameRequester {
    /// Schedule one callback and return its handle.
    fn request(&mut self) -> i32;
    fn cancel(&mut self, handle: i32);
}

#[derive(Debug)]
pub struct RenderLoop<R: FrameRequester> {
    requester: R,
    pending: Option<i32>,
    key: Option<u64>,
    running: bool,
    frames: u64,
}

impl<R: FrameRequester> RenderLoop<R> {
    pub fn new(requester: R) -> Self {
        Self {
            requester,
            pending: None,
            key: None,
            running: false,
            frames: 0,
        }
    }

    /// Restart when `key` differs from the last synced key. Returns whether
    /// a restart happened.
    pub fn sync(&mut self, key: u64) -> bool {
        if self.running && self.key == Some(key) {
            return false;
        }
        self.cancel_pending();
        self.key = Some(key);
        self.running = true;
        self.arm();
        log::trace!("render loop restarted (key {key:#x})");
        true
    }

    pub fn stop(&mut self) {
        self.cancel_pending();
        self.running = false;
        self.key = None;
    }

    /// Called from the frame callback. Returns whether the host should
    /// draw; re-arms while running.
    pub fn on_frame(&mut self) -> bool {
        self.pending = None;
        if !self.running {
            return false;
        }
        self.frames += 1;
        self.arm();
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    fn arm(&mut self) {
        self.pending = Some(self.requester.request());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.requester.cancel(handle);
        }
    }
}

/// Hash any dependency tuple into a loop key.
pub fn dependency_key(deps: impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    deps.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeRequester {
        next: i32,
        live: Vec<i32>,
        cancelled: Vec<i32>,
    }

    impl FrameRequester for FakeRequester {
        fn request(&mut self) -> i32 {
            self.next += 1;
            self.live.push(self.next);
            self.next
        }

        fn cancel(&mut self, handle: i32) {
            self.live.retain(|h| *h != handle);
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn same_key_does_not_restart() {
        let mut lp = RenderLoop::new(FakeRequester::default());
        assert!(lp.sync(1));
        assert!(!lp.sync(1));
        assert_eq!(lp.requester().live, vec![1]);
    }

    #[test]
    fn key_change_cancels_pending_frame() {
        let mut lp = RenderLoop::new(FakeRequester::default());
        lp.sync(1);
        lp.sync(2);
        assert_eq!(lp.requester().cancelled, vec![1]);
        assert_eq!(lp.requester().live, vec![2]);
    }

    #[test]
    fn frames_rearm_until_stopped() {
        let mut lp = RenderLoop::new(FakeRequester::default());
        lp.sync(7);
        assert!(lp.on_frame());
        assert!(lp.on_frame());
        assert_eq!(lp.frames(), 2);
        lp.stop();
        assert!(!lp.is_running());
        assert!(!lp.on_frame());
        assert_eq!(lp.requester().cancelled, vec![3]);
    }

    #[test]
    fn dependency_key_is_stable() {
        assert_eq!(dependency_key((1u64, "drag")), dependency_key((1u64, "drag")));
        assert_ne!(dependency_key((1u64, "drag")), dependency_key((2u64, "drag")));
    }
}
