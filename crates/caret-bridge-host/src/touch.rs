//! Touch routing for an editable view nested in a vertical scroll container.
//!
//! Multi-finger gestures are swallowed. Single-finger drags stay in the view
//! when they are mostly horizontal and are left to the parent otherwise.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointer_count: usize,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn single(action: TouchAction, x: f32, y: f32) -> Self {
        Self {
            action,
            pointer_count: 1,
            x,
            y,
        }
    }
}

/// What the view should do with a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchDisposition {
    /// Report the event as handled without passing it on.
    Consume,
    /// Let the view process the event normally.
    Dispatch {
        /// `Some(true)` keeps the gesture from the parent, `Some(false)` hands
        /// it back, `None` leaves the parent's state alone.
        disallow_parent_intercept: Option<bool>,
    },
}

impl TouchDisposition {
    const PASS: Self = TouchDisposition::Dispatch {
        disallow_parent_intercept: None,
    };
}

#[derive(Debug, Default)]
pub struct TouchTracker {
    last: Option<(f32, f32)>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_touch(&mut self, event: TouchEvent) -> TouchDisposition {
        if event.pointer_count > 1 {
            return TouchDisposition::Consume;
        }

        match event.action {
            TouchAction::Down => {
                self.last = Some((event.x, event.y));
                TouchDisposition::PASS
            }
            TouchAction::Move => {
                let Some((last_x, last_y)) = self.last.replace((event.x, event.y)) else {
                    return TouchDisposition::PASS;
                };
                let dx = (event.x - last_x).abs();
                let dy = (event.y - last_y).abs();
                let horizontal = dx - dy > 0.0;
                tracing::trace!(target: "caret_bridge::touch", dx, dy, horizontal, "move");
                TouchDisposition::Dispatch {
                    disallow_parent_intercept: Some(horizontal),
                }
            }
            TouchAction::Up | TouchAction::Cancel => TouchDisposition::PASS,
        }
    }
}
