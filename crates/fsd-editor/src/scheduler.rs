//! Frame scheduling.
//!
//! Render and resize requests are coalesced: however many arrive between
//! two frames, at most one frame is pending. The host maps "a frame is
//! pending" onto `requestAnimationFrame` (or a fixed-tick loop) and calls
//! [`FrameScheduler::poll`] from the callback.

use smallvec::SmallVec;

/// Re-render delays after the tab becomes visible again, in milliseconds.
pub const RECOVERY_DELAYS_MS: [f64; 2] = [120.0, 360.0];

/// What a frame callback has to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameWork {
    pub resize: bool,
    pub render: bool,
}

impl FrameWork {
    pub fn is_empty(&self) -> bool {
        !self.resize && !self.render
    }
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    render_scheduled: bool,
    resize_scheduled: bool,
    /// Deadlines for delayed re-renders, sorted ascending.
    deferred: SmallVec<[f64; 2]>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a render on the next frame. Returns `true` if the host has to
    /// request a new frame, `false` if one is already pending.
    pub fn schedule_render(&mut self) -> bool {
        let newly = !self.frame_pending();
        self.render_scheduled = true;
        newly
    }

    /// Ask for a resize flush on the next frame; same return contract as
    /// [`schedule_render`](Self::schedule_render).
    pub fn schedule_resize(&mut self) -> bool {
        let newly = !self.frame_pending();
        self.resize_scheduled = true;
        newly
    }

    /// Render now and again after each of `RECOVERY_DELAYS_MS`.
    pub fn request_recovery_burst(&mut self, now_ms: f64) -> bool {
        self.deferred = RECOVERY_DELAYS_MS.iter().map(|d| now_ms + d).collect();
        self.schedule_render()
    }

    pub fn frame_pending(&self) -> bool {
        self.render_scheduled || self.resize_scheduled
    }

    /// Earliest delayed re-render still waiting, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        self.deferred.first().copied()
    }

    /// Whether anything is pending now or later.
    pub fn is_idle(&self) -> bool {
        !self.frame_pending() && self.deferred.is_empty()
    }

    /// Take the work due at `now_ms`, clearing the pending flags.
    pub fn poll(&mut self, now_ms: f64) -> FrameWork {
        let due = self.deferred.iter().take_while(|&&d| d <= now_ms).count();
        if due > 0 {
            self.deferred.drain(..due);
        }
        let work = FrameWork {
            resize: self.resize_scheduled,
            render: self.render_scheduled || due > 0,
        };
        self.render_scheduled = false;
        self.resize_scheduled = false;
        work
    }

    /// Drop everything pending.
    pub fn cancel(&mut self) {
        self.render_scheduled = false;
        self.resize_scheduled = false;
        self.deferred.clear();
    }
}
