use std::collections::HashSet;

use tally_core::{Frame, Vec2};
use tally_ui::Interactions;

/// Touch travel in dp after which a press turns into a scroll.
pub const TOUCH_SLOP_DP: f32 = 6.0;

/// Lines to px for wheels that report in lines.
pub const WHEEL_LINE_PX: f32 = 40.0;

/// Find the top-most hit region index under `pos` (reverse iteration).
pub(crate) fn top_hit_index(frame: &Frame, pos: Vec2) -> Option<usize> {
    frame
        .hit_regions
        .iter()
        .enumerate()
        .rev()
        .find(|(_, h)| h.rect.contains(pos))
        .map(|(i, _)| i)
}

/// Top-most clickable region under `pos`. Scroll-only regions are skipped so
/// a press inside a list still reaches the buttons above it.
pub(crate) fn top_click_index(frame: &Frame, pos: Vec2) -> Option<usize> {
    frame
        .hit_regions
        .iter()
        .enumerate()
        .rev()
        .find(|(_, h)| h.on_click.is_some() && h.rect.contains(pos))
        .map(|(i, _)| i)
}

pub(crate) fn hit_index_by_id(frame: &Frame, id: u64) -> Option<usize> {
    frame.hit_regions.iter().position(|h| h.id == id)
}

/// Dispatch wheel/touch-scroll to the top-most scroll consumer under `pos`.
/// Returns `true` if something consumed the scroll.
pub(crate) fn dispatch_scroll(frame: &Frame, pos: Vec2, delta: Vec2) -> bool {
    for hit in frame
        .hit_regions
        .iter()
        .rev()
        .filter(|h| h.rect.contains(pos))
    {
        if let Some(cb) = &hit.on_scroll {
            let leftover = cb(delta);
            let consumed_x = (delta.x - leftover.x).abs() > 0.001;
            let consumed_y = (delta.y - leftover.y).abs() > 0.001;
            if consumed_x || consumed_y {
                return true;
            }
        }
    }
    false
}

#[derive(Clone, Copy, Debug)]
struct TouchTrack {
    finger: u64,
    start: Vec2,
    last: Vec2,
    dragging: bool,
}

/// Routes pointer input against the last painted frame.
///
/// Press captures the top-most clickable region; release fires its click
/// only if the pointer is still inside it. Every method returns whether the
/// UI needs a redraw.
#[derive(Debug, Default)]
pub struct PointerRouter {
    pos: Vec2,
    hover: Option<u64>,
    capture: Option<u64>,
    pressed: HashSet<u64>,
    touch: Option<TouchTrack>,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn captured(&self) -> Option<u64> {
        self.capture
    }

    /// Hover and pressed ids for the next paint.
    pub fn interactions(&self) -> Interactions {
        Interactions {
            hover: self.hover,
            pressed: self.pressed.clone(),
        }
    }

    pub fn pointer_moved(&mut self, frame: &Frame, pos: Vec2) -> bool {
        self.pos = pos;
        let hover = top_hit_index(frame, pos)
            .map(|i| frame.hit_regions[i].id)
            .filter(|id| frame.hit_region(*id).is_some_and(|h| h.on_click.is_some()));
        let changed = hover != self.hover;
        self.hover = hover;
        changed
    }

    pub fn pointer_left(&mut self) -> bool {
        let changed = self.hover.take().is_some();
        changed || self.cancel()
    }

    pub fn press(&mut self, frame: &Frame) -> bool {
        let Some(i) = top_click_index(frame, self.pos) else {
            return false;
        };
        let id = frame.hit_regions[i].id;
        self.capture = Some(id);
        self.pressed.insert(id);
        true
    }

    pub fn release(&mut self, frame: &Frame) -> bool {
        let Some(id) = self.capture.take() else {
            return false;
        };
        self.pressed.remove(&id);
        if let Some(hit) = hit_index_by_id(frame, id).map(|i| &frame.hit_regions[i]) {
            if hit.rect.contains(self.pos) {
                if let Some(cb) = &hit.on_click {
                    log::debug!("click on region {id}");
                    cb();
                }
            }
        }
        true
    }

    /// `delta` is in px, positive y scrolls content up (towards later rows).
    pub fn wheel(&mut self, frame: &Frame, delta: Vec2) -> bool {
        dispatch_scroll(frame, self.pos, delta)
    }

    pub fn touch_start(&mut self, frame: &Frame, finger: u64, pos: Vec2) -> bool {
        if self.touch.is_some() {
            // Second finger; single-pointer routing only.
            return false;
        }
        self.pos = pos;
        self.touch = Some(TouchTrack {
            finger,
            start: pos,
            last: pos,
            dragging: false,
        });
        self.press(frame)
    }

    pub fn touch_move(&mut self, frame: &Frame, finger: u64, pos: Vec2, slop_px: f32) -> bool {
        let Some(mut t) = self.touch.filter(|t| t.finger == finger) else {
            return false;
        };
        self.pos = pos;
        let mut redraw = false;
        if !t.dragging && (pos - t.start).length() > slop_px {
            t.dragging = true;
            if let Some(id) = self.capture.take() {
                self.pressed.remove(&id);
                redraw = true;
            }
        }
        if t.dragging {
            // Finger up means content moves up, so the offset grows.
            let delta = t.last - pos;
            redraw |= dispatch_scroll(frame, t.start, delta);
            t.last = pos;
        }
        self.touch = Some(t);
        redraw
    }

    pub fn touch_end(&mut self, frame: &Frame, finger: u64, pos: Vec2) -> bool {
        let Some(t) = self.touch.filter(|t| t.finger == finger) else {
            return false;
        };
        self.touch = None;
        self.pos = pos;
        if t.dragging {
            self.cancel()
        } else {
            self.release(frame)
        }
    }

    /// Drops any capture without firing clicks.
    pub fn cancel(&mut self) -> bool {
        self.touch = None;
        let had = self.capture.take().is_some() || !self.pressed.is_empty();
        self.pressed.clear();
        had
    }
}
