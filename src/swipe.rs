//! Swipe-to-complete / swipe-to-delete gesture, modeled as a state machine
//! over pointer column deltas so it can be exercised without a terminal.

/// Columns the pointer must travel before release commits an action.
pub const SWIPE_THRESHOLD: i32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeState {
    Idle,
    /// Pointer down on a task row; delta is signed columns from the origin.
    Dragging { start_col: u16, delta: i32 },
    /// Released before the threshold; delta decays back to zero over ticks.
    Reverting { delta: i32 },
}

/// What a release resolved to. `Complete` for a rightward swipe past the
/// threshold, `Delete` for leftward, `Revert` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeOutcome {
    Complete,
    Delete,
    Revert,
}

#[derive(Clone, Copy, Debug)]
pub struct Swipe {
    state: SwipeState,
}

impl Default for Swipe {
    fn default() -> Self {
        Swipe::new()
    }
}

impl Swipe {
    pub fn new() -> Swipe {
        Swipe {
            state: SwipeState::Idle,
        }
    }

    pub fn state(&self) -> SwipeState {
        self.state
    }

    /// Pointer down. A new gesture interrupts an in-flight revert.
    pub fn begin(&mut self, col: u16) {
        self.state = SwipeState::Dragging {
            start_col: col,
            delta: 0,
        };
    }

    /// Pointer moved while held.
    pub fn drag(&mut self, col: u16) {
        if let SwipeState::Dragging { start_col, .. } = self.state {
            self.state = SwipeState::Dragging {
                start_col,
                delta: col as i32 - start_col as i32,
            };
        }
    }

    /// Pointer up: resolve the gesture.
    pub fn release(&mut self) -> SwipeOutcome {
        match self.state {
            SwipeState::Dragging { delta, .. } if delta >= SWIPE_THRESHOLD => {
                self.state = SwipeState::Idle;
                SwipeOutcome::Complete
            }
            SwipeState::Dragging { delta, .. } if delta <= -SWIPE_THRESHOLD => {
                self.state = SwipeState::Idle;
                SwipeOutcome::Delete
            }
            SwipeState::Dragging { delta, .. } if delta != 0 => {
                self.state = SwipeState::Reverting { delta };
                SwipeOutcome::Revert
            }
            _ => {
                self.state = SwipeState::Idle;
                SwipeOutcome::Revert
            }
        }
    }

    /// Advance the revert animation one frame.
    pub fn tick(&mut self) {
        if let SwipeState::Reverting { delta } = self.state {
            let next = delta - delta.signum() * 2;
            self.state = if next == 0 || next.signum() != delta.signum() {
                SwipeState::Idle
            } else {
                SwipeState::Reverting { delta: next }
            };
        }
    }

    /// Current visual offset in columns.
    pub fn delta(&self) -> i32 {
        match self.state {
            SwipeState::Idle => 0,
            SwipeState::Dragging { delta, .. } | SwipeState::Reverting { delta } => delta,
        }
    }

    /// Signed fraction of the threshold in `[-1, 1]`, drives the row shading.
    pub fn progress(&self) -> f64 {
        (self.delta() as f64 / SWIPE_THRESHOLD as f64).clamp(-1.0, 1.0)
    }

    pub fn is_active(&self) -> bool {
        self.state != SwipeState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_right_swipe_past_threshold_completes() {
        let mut swipe = Swipe::new();
        swipe.begin(10);
        swipe.drag(10 + SWIPE_THRESHOLD as u16);
        assert_eq!(swipe.release(), SwipeOutcome::Complete);
        assert_eq!(swipe.state(), SwipeState::Idle);
    }

    #[test]
    fn test_left_swipe_past_threshold_deletes() {
        let mut swipe = Swipe::new();
        swipe.begin(20);
        swipe.drag(20 - SWIPE_THRESHOLD as u16);
        assert_eq!(swipe.release(), SwipeOutcome::Delete);
    }

    #[test]
    fn test_short_swipe_reverts_and_decays_to_idle() {
        let mut swipe = Swipe::new();
        swipe.begin(10);
        swipe.drag(13);
        assert_eq!(swipe.release(), SwipeOutcome::Revert);
        assert_eq!(swipe.state(), SwipeState::Reverting { delta: 3 });
        swipe.tick();
        assert_eq!(swipe.delta(), 1);
        swipe.tick();
        assert_eq!(swipe.state(), SwipeState::Idle);
    }

    #[test]
    fn test_drag_back_under_threshold_reverts() {
        let mut swipe = Swipe::new();
        swipe.begin(10);
        swipe.drag(25);
        swipe.drag(12);
        assert_eq!(swipe.release(), SwipeOutcome::Revert);
    }

    #[test]
    fn test_progress_is_proportional_and_clamped() {
        let mut swipe = Swipe::new();
        swipe.begin(10);
        swipe.drag(14);
        assert_eq!(swipe.progress(), 0.5);
        swipe.drag(40);
        assert_eq!(swipe.progress(), 1.0);
        swipe.drag(0);
        assert_eq!(swipe.progress(), -1.0);
    }

    #[test]
    fn test_new_gesture_interrupts_revert() {
        let mut swipe = Swipe::new();
        swipe.begin(10);
        swipe.drag(14);
        swipe.release();
        assert!(swipe.is_active());
        swipe.begin(30);
        assert_eq!(swipe.state(), SwipeState::Dragging { start_col: 30, delta: 0 });
    }
}
