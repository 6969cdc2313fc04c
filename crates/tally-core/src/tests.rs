#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#34AF82"), Color(0x34, 0xAF, 0x82, 255));
        assert_eq!(Color::from_hex("10203040"), Color(0x10, 0x20, 0x30, 0x40));
        assert_eq!(Color::from_hex("#xyz"), Color::BLACK);
    }

    #[test]
    fn test_color_fade() {
        assert_eq!(Color::WHITE.fade(0.5).3, 128);
        assert_eq!(Color::WHITE.fade(2.0), Color::WHITE);
    }

    #[test]
    fn test_color_to_linear_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0, 1.0]);
        let w = Color::WHITE.to_linear();
        assert!((w[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(r.contains(Vec2::new(30.0, 30.0)));
        assert!(!r.contains(Vec2::new(30.1, 15.0)));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.intersect(&Rect::new(10.0, 0.0, 5.0, 5.0)), None);
    }

    #[test]
    fn test_rect_inset_never_negative() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(8.0, 8.0, 8.0, 8.0);
        assert_eq!((r.w, r.h), (0.0, 0.0));
    }

    #[test]
    fn test_locals_unit_conversion() {
        let locals = Locals {
            density: Density { scale: 2.0 },
            text_scale: TextScale(1.5),
            ..Locals::default()
        };
        assert_eq!(locals.dp_to_px(10.0), 20.0);
        assert_eq!(locals.px_to_dp(20.0), 10.0);
        assert_eq!(locals.font_px(16.0), 48.0);
    }

    #[test]
    fn test_modifier_builder() {
        let m = Modifier::new()
            .padding(8.0)
            .fill_max_width()
            .key(7)
            .background(Color::WHITE);
        assert_eq!(m.padding, Some(8.0));
        assert!(m.fill_max_w);
        assert_eq!(m.key, Some(7));
        assert_eq!(m.background, Some(Color::WHITE));
    }

    #[test]
    fn test_view_count() {
        let v = View::new(0, ViewKind::Column).with_children(vec![
            View::new(0, ViewKind::Box),
            View::new(0, ViewKind::Row).with_children(vec![View::new(0, ViewKind::Box)]),
        ]);
        assert_eq!(v.count(), 4);
    }

    #[test]
    fn test_scheduler_passes_size_and_locals() {
        let mut sched = Scheduler::new();
        sched.size = (320, 240);
        sched.locals.density = Density { scale: 3.0 };
        let frame = sched.compose(
            |_| View::new(0, ViewKind::Box),
            |_root, size, locals| {
                assert_eq!(size, (320, 240));
                assert_eq!(locals.density.scale, 3.0);
                Frame {
                    animating: true,
                    ..Frame::default()
                }
            },
        );
        assert!(frame.animating);
    }
}
