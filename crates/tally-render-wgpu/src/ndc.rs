//! Pixel to clip-space conversions and scissor math.

use tally_core::Rect;

/// Rect in px to `[min_x, min_y, w, h]` in NDC (y up).
pub fn to_ndc(r: Rect, fb_w: f32, fb_h: f32) -> [f32; 4] {
    let x0 = (r.x / fb_w) * 2.0 - 1.0;
    let y0 = 1.0 - (r.y / fb_h) * 2.0;
    let x1 = ((r.x + r.w) / fb_w) * 2.0 - 1.0;
    let y1 = 1.0 - ((r.y + r.h) / fb_h) * 2.0;
    [x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs()]
}

/// A length in px (radius, stroke) in NDC, using the smaller axis scale.
pub fn to_ndc_len(px: f32, fb_w: f32, fb_h: f32) -> f32 {
    ((px / fb_w) * 2.0).min((px / fb_h) * 2.0)
}

/// Integer scissor rect clamped to the framebuffer. Empty rects become zero.
pub fn to_scissor(r: &Rect, fb_w: u32, fb_h: u32) -> (u32, u32, u32, u32) {
    if r.w <= 0.0 || r.h <= 0.0 {
        return (0, 0, 0, 0);
    }
    let x0 = (r.x.floor() as i64).clamp(0, fb_w as i64);
    let y0 = (r.y.floor() as i64).clamp(0, fb_h as i64);
    let x1 = ((r.x + r.w).ceil() as i64).clamp(0, fb_w as i64);
    let y1 = ((r.y + r.h).ceil() as i64).clamp(0, fb_h as i64);
    if x1 <= x0 || y1 <= y0 {
        return (0, 0, 0, 0);
    }
    (x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
}

/// Nested clip rects. Pushing intersects with the current top.
pub struct ClipStack {
    root: Rect,
    stack: Vec<Rect>,
}

impl ClipStack {
    pub fn new(root: Rect) -> Self {
        Self {
            root,
            stack: Vec::with_capacity(8),
        }
    }

    pub fn top(&self) -> Rect {
        self.stack.last().copied().unwrap_or(self.root)
    }

    pub fn push(&mut self, r: Rect) -> Rect {
        let next = self
            .top()
            .intersect(&r)
            .unwrap_or(Rect::new(r.x, r.y, 0.0, 0.0));
        self.stack.push(next);
        next
    }

    pub fn pop(&mut self) -> Rect {
        if self.stack.pop().is_none() {
            log::warn!("PopClip with empty stack");
        }
        self.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_screen_maps_to_unit_square() {
        let n = to_ndc(Rect::new(0.0, 0.0, 200.0, 100.0), 200.0, 100.0);
        assert_eq!(n, [-1.0, -1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_scissor_clamps_to_framebuffer() {
        assert_eq!(
            to_scissor(&Rect::new(-10.0, 5.5, 50.0, 200.0), 100, 100),
            (0, 5, 40, 95)
        );
        assert_eq!(to_scissor(&Rect::new(150.0, 0.0, 10.0, 10.0), 100, 100), (0, 0, 0, 0));
    }

    #[test]
    fn test_clip_stack_intersects_and_restores() {
        let mut cs = ClipStack::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(cs.push(Rect::new(50.0, 50.0, 100.0, 100.0)), Rect::new(50.0, 50.0, 50.0, 50.0));
        let inner = cs.push(Rect::new(0.0, 0.0, 60.0, 60.0));
        assert_eq!(inner, Rect::new(50.0, 50.0, 10.0, 10.0));
        // Disjoint clip yields an empty rect
        let empty = cs.push(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!((empty.w, empty.h), (0.0, 0.0));
        cs.pop();
        cs.pop();
        assert_eq!(cs.pop(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(cs.pop(), Rect::new(0.0, 0.0, 100.0, 100.0));
    }
}
