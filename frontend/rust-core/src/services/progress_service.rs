//! Slide navigation gating and backend progress persistence.
//!
//! The gate is a synchronous state machine the host UI drives; persistence
//! is a separate debounced writer so rapid navigation coalesces into one
//! save. Keyboard, touch and button navigation all route through the same
//! `begin_next`/`begin_prev` entry points, so there is a single
//! authorization path.

use crate::client::ApiClient;
use crate::models::progress::ModuleProgress;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// An in-flight slide transition. The index only commits when the host calls
/// [`ProgressGate::complete_transition`], letting it run the visual effect in
/// between without blocking data state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
}

/// What a committed transition produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub index: usize,
    /// True exactly once per gate lifetime, when the last slide is first
    /// reached.
    pub all_slides_viewed: bool,
}

pub struct ProgressGate {
    total: usize,
    current: usize,
    max_viewed: usize,
    transition: Option<Transition>,
    last_slide_seen: bool,
}

impl ProgressGate {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            current: 0,
            max_viewed: 0,
            transition: None,
            last_slide_seen: false,
        }
    }

    /// Resume at a previously saved index. Out-of-range or unreachable saves
    /// clamp into range; everything up to the resume point counts as viewed.
    pub fn resume_at(total: usize, saved_index: usize) -> Self {
        let mut gate = Self::new(total);
        if total > 0 {
            let index = saved_index.min(total - 1);
            gate.current = index;
            gate.max_viewed = index;
            if index == total - 1 {
                gate.last_slide_seen = true;
            }
        }
        gate
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn max_viewed(&self) -> usize {
        self.max_viewed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn begin_next(&mut self) -> Option<Transition> {
        if self.transition.is_some() || self.current + 1 >= self.total {
            return None;
        }
        self.start(self.current + 1, Direction::Right)
    }

    pub fn begin_prev(&mut self) -> Option<Transition> {
        if self.transition.is_some() || self.current == 0 {
            return None;
        }
        self.start(self.current - 1, Direction::Left)
    }

    /// Direct jump, permitted only within already-viewed territory. Forward
    /// skips are rejected silently; the high-water mark only moves through
    /// sequential navigation.
    pub fn begin_jump(&mut self, index: usize) -> Option<Transition> {
        if index > self.max_viewed {
            tracing::debug!(
                requested = index,
                max_viewed = self.max_viewed,
                "jump past unseen slides rejected"
            );
            return None;
        }
        if index == self.current || self.transition.is_some() || index >= self.total {
            return None;
        }
        let direction = if index > self.current {
            Direction::Right
        } else {
            Direction::Left
        };
        self.start(index, direction)
    }

    fn start(&mut self, to: usize, direction: Direction) -> Option<Transition> {
        let transition = Transition {
            from: self.current,
            to,
            direction,
        };
        self.transition = Some(transition);
        Some(transition)
    }

    /// Commit the pending transition. No-op if none is pending.
    pub fn complete_transition(&mut self) -> Option<Committed> {
        let transition = self.transition.take()?;
        self.current = transition.to;
        if self.current > self.max_viewed {
            self.max_viewed = self.current;
        }

        let mut all_viewed = false;
        if self.total > 0 && self.current == self.total - 1 && !self.last_slide_seen {
            self.last_slide_seen = true;
            all_viewed = true;
            tracing::info!(total = self.total, "all slides viewed");
        }

        Some(Committed {
            index: self.current,
            all_slides_viewed: all_viewed,
        })
    }

    // Begin-and-commit conveniences for hosts that do not animate.

    pub fn next(&mut self) -> Option<Committed> {
        self.begin_next()?;
        self.complete_transition()
    }

    pub fn prev(&mut self) -> Option<Committed> {
        self.begin_prev()?;
        self.complete_transition()
    }

    pub fn jump_to(&mut self, index: usize) -> Option<Committed> {
        self.begin_jump(index)?;
        self.complete_transition()
    }
}

/// Debounced backend persistence for the slide position. Each recorded
/// change cancels the previous pending save and restarts the quiet period,
/// so a navigation burst produces a single POST.
pub struct ProgressSync {
    client: Arc<ApiClient>,
    module_id: String,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl ProgressSync {
    pub fn new(client: Arc<ApiClient>, module_id: impl Into<String>, debounce: Duration) -> Self {
        Self {
            client,
            module_id: module_id.into(),
            debounce,
            pending: None,
        }
    }

    /// Fetch the saved position. Any failure means "start from the top";
    /// a missing save is not an error.
    pub async fn resume(&self) -> usize {
        match self.client.get_module_progress(&self.module_id).await {
            Ok(progress) if progress.current_slide > 0 => progress.current_slide as usize,
            Ok(_) => 0,
            Err(e) => {
                tracing::debug!(module = %self.module_id, error = %e, "no saved progress, starting from beginning");
                0
            }
        }
    }

    /// Schedule an upsert of the current position, debounced.
    pub fn record(&mut self, current_slide: usize, total_slides: usize) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let client = self.client.clone();
        let module_id = self.module_id.clone();
        let debounce = self.debounce;
        let progress = ModuleProgress {
            current_slide: current_slide as u32,
            total_slides: total_slides as u32,
        };

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            match client.save_module_progress(&module_id, &progress).await {
                Ok(()) => tracing::debug!(
                    module = %module_id,
                    slide = progress.current_slide,
                    "progress saved"
                ),
                Err(e) => tracing::warn!(module = %module_id, error = %e, "failed to save progress"),
            }
        }));
    }

    /// Wait for any pending save to finish (test hook and page-leave flush).
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressSync {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
