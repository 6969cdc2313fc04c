use std::cell::Cell;
use std::rc::Rc;

use tally_core::*;
use web_time::Instant;

/// Scroll position and fling state of a `LazyColumn`. All lengths are dp.
///
/// Owned by the caller and shared with the list through an `Rc`, so it
/// survives the per-frame rebuild of the view tree.
pub struct LazyColumnState {
    scroll_offset: Cell<f32>,
    viewport_height: Cell<f32>,
    content_height: Cell<f32>,

    // physics
    vel: Cell<f32>, // dp/sec
    last_t: Cell<Instant>,
    last_input_t: Cell<Instant>,
    animating: Cell<bool>,
}

impl Default for LazyColumnState {
    fn default() -> Self {
        Self::new()
    }
}

impl LazyColumnState {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            scroll_offset: Cell::new(0.0),
            viewport_height: Cell::new(600.0),
            content_height: Cell::new(0.0),
            vel: Cell::new(0.0),
            last_t: Cell::new(now),
            last_input_t: Cell::new(now),
            animating: Cell::new(false),
        }
    }

    pub fn offset(&self) -> f32 {
        self.scroll_offset.get()
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height.get()
    }

    /// Fling velocity, dp/sec.
    pub fn velocity(&self) -> f32 {
        self.vel.get()
    }

    pub fn is_animating(&self) -> bool {
        self.animating.get()
    }

    fn max_offset(&self, content_height: f32) -> f32 {
        (content_height - self.viewport_height.get()).max(0.0)
    }

    pub fn set_offset(&self, off: f32, content_height: f32) {
        self.scroll_offset.set(off.clamp(0.0, self.max_offset(content_height)));
    }

    /// Jumps back to the first item and stops any fling.
    pub fn scroll_to_top(&self) {
        self.scroll_offset.set(0.0);
        self.stop();
    }

    pub fn stop(&self) {
        self.vel.set(0.0);
        self.animating.set(false);
    }

    /// Consumes `delta`. Returns the leftover (for nested scroll).
    pub fn scroll_immediate(&self, delta: f32, content_height: f32) -> f32 {
        let before = self.scroll_offset.get();
        let new_offset = (before + delta).clamp(0.0, self.max_offset(content_height));
        self.scroll_offset.set(new_offset);

        let consumed = new_offset - before;

        // estimate velocity from input cadence
        let now = Instant::now();
        let dt = (now - self.last_input_t.get())
            .as_secs_f32()
            .clamp(1.0 / 240.0, 1.0 / 15.0);
        self.last_input_t.set(now);
        self.last_t.set(now);

        self.vel.set(consumed / dt);
        self.animating.set(self.vel.get().abs() > 10.0);

        delta - consumed
    }

    /// Advances inertia one tick; returns true while still moving.
    pub fn tick(&self, content_height: f32) -> bool {
        if !self.animating.get() {
            return false;
        }

        let now = Instant::now();
        let dt = (now - self.last_t.get()).as_secs_f32().min(0.1);
        self.last_t.set(now);
        if dt <= 0.0 {
            return true;
        }

        let vel0 = self.vel.get();
        if vel0.abs() < 5.0 {
            self.stop();
            return false;
        }

        let before = self.scroll_offset.get();
        let max_offset = self.max_offset(content_height);
        let new_off = (before + vel0 * dt).clamp(0.0, max_offset);
        self.scroll_offset.set(new_off);

        // Stop quickly at bounds
        if (new_off - before).abs() < 0.01 && (before <= 0.0 || before >= max_offset) {
            self.stop();
            return false;
        }

        // decay ~0.9 per 60Hz frame
        self.vel.set(vel0 * 0.90f32.powf(dt * 60.0));
        true
    }
}

/// Virtualized vertical list of fixed-height rows; only rows near the
/// viewport are built. `item_height` is dp and each row should use it.
pub fn LazyColumn<T, F>(
    items: Vec<T>,
    item_height: f32,
    state: Rc<LazyColumnState>,
    modifier: Modifier,
    item_builder: F,
) -> View
where
    F: Fn(T, usize) -> View,
{
    let item_height = item_height.max(1.0);
    let len = items.len();
    let content_height = len as f32 * item_height;
    state.content_height.set(content_height);

    // Re-clamp in case the list shrank or the viewport grew, then advance physics
    state.set_offset(state.offset(), content_height);
    state.tick(content_height);

    let offset = state.offset();
    let viewport = state.viewport_height();

    let buffer = 2usize;
    let first_visible = (offset / item_height).floor().max(0.0) as usize;
    let last_visible = (((offset + viewport) / item_height).ceil() as usize + buffer).min(len);
    let first = first_visible.saturating_sub(buffer).min(last_visible);

    let mut children = Vec::with_capacity(last_visible - first + 2);

    if first > 0 {
        children.push(crate::Box(
            Modifier::new().height(first as f32 * item_height),
        ));
    }
    for (i, item) in items.into_iter().enumerate().skip(first).take(last_visible - first) {
        children.push(item_builder(item, i));
    }
    if last_visible < len {
        children.push(crate::Box(
            Modifier::new().height((len - last_visible) as f32 * item_height),
        ));
    }

    let on_scroll = {
        let st = state.clone();
        Rc::new(move |d: Vec2| -> Vec2 {
            let leftover = st.scroll_immediate(d.y, st.content_height.get());
            Vec2::new(d.x, leftover)
        })
    };
    let set_viewport = {
        let st = state.clone();
        Rc::new(move |h: f32| st.viewport_height.set(h.max(0.0)))
    };
    let set_content = {
        let st = state.clone();
        Rc::new(move |h: f32| {
            st.content_height.set(h);
            st.set_offset(st.offset(), h);
        })
    };
    let get_scroll = {
        let st = state.clone();
        Rc::new(move || st.offset())
    };
    let is_animating = {
        let st = state.clone();
        Rc::new(move || st.is_animating())
    };

    let content = crate::Column(Modifier::new()).with_children(children);

    View::new(
        0,
        ViewKind::ScrollV {
            on_scroll: Some(on_scroll),
            set_viewport_height: Some(set_viewport),
            set_content_height: Some(set_content),
            get_scroll_offset: Some(get_scroll),
            is_animating: Some(is_animating),
        },
    )
    .modifier(modifier)
    .with_children(vec![content])
}
