use std::sync::Arc;

use tally_core::{Frame, RenderBackend, Scheduler, Vec2, View};
use tally_render_wgpu::WgpuBackend;
use tally_ui::layout_and_paint;
use web_time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, MouseButton, MouseScrollDelta, StartCause, TouchPhase, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::{PointerRouter, RunOptions, TOUCH_SLOP_DP, WHEEL_LINE_PX};

type Root = Box<dyn FnMut(&Scheduler) -> View>;

pub(crate) struct App {
    root: Root,
    options: RunOptions,
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    sched: Scheduler,
    frame_cache: Option<Frame>,
    router: PointerRouter,
    animating: bool,
    last_redraw: Instant,
}

impl App {
    pub(crate) fn new(options: RunOptions, root: Root) -> Self {
        Self {
            root,
            options,
            window: None,
            backend: None,
            sched: Scheduler::new(),
            frame_cache: None,
            router: PointerRouter::new(),
            animating: false,
            last_redraw: Instant::now(),
        }
    }

    fn request_redraw(&self) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    /// Runs `f` against the last painted frame and redraws if it asks to.
    fn route(&mut self, f: impl FnOnce(&mut PointerRouter, &Frame) -> bool) {
        let Some(frame) = &self.frame_cache else {
            return;
        };
        if f(&mut self.router, frame) {
            self.request_redraw();
        }
    }

    fn set_scale(&mut self, scale: f64) {
        self.sched.locals.density.scale = scale as f32;
        log::debug!("density scale {scale}");
    }

    fn ensure_window(&mut self, el: &ActiveEventLoop) -> Option<Arc<Window>> {
        if let Some(w) = &self.window {
            return Some(w.clone());
        }
        let (w, h) = self.options.size;
        let attrs = WindowAttributes::default()
            .with_title(self.options.title.clone())
            .with_inner_size(LogicalSize::new(w, h));
        match el.create_window(attrs) {
            Ok(win) => {
                let win = Arc::new(win);
                self.window = Some(win.clone());
                Some(win)
            }
            Err(e) => {
                log::error!("Failed to create window: {e:?}");
                None
            }
        }
    }

    fn redraw(&mut self) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        let interactions = self.router.interactions();
        let frame = self.sched.compose(&mut self.root, |view, size, locals| {
            layout_and_paint(view, size, locals, &interactions)
        });
        backend.frame(&frame.scene);
        self.animating = frame.animating;
        self.frame_cache = Some(frame);
        self.last_redraw = Instant::now();
    }
}

impl ApplicationHandler<()> for App {
    fn resumed(&mut self, el: &ActiveEventLoop) {
        let Some(win) = self.ensure_window(el) else {
            el.exit();
            return;
        };
        if self.backend.is_some() {
            return;
        }
        let size = win.inner_size();
        self.sched.size = (size.width, size.height);
        self.set_scale(win.scale_factor());
        match WgpuBackend::new(win.clone()) {
            Ok(b) => {
                log::info!("renderer ready at {}x{}", size.width, size.height);
                self.backend = Some(b);
                self.request_redraw();
            }
            Err(e) => {
                log::error!("Failed to create WGPU backend: {e:?}");
                el.exit();
            }
        }
    }

    fn suspended(&mut self, _el: &ActiveEventLoop) {
        // The native surface goes away while suspended.
        log::info!("suspended; releasing renderer");
        self.backend = None;
        self.router.cancel();
    }

    fn new_events(&mut self, _el: &ActiveEventLoop, cause: StartCause) {
        if matches!(cause, StartCause::ResumeTimeReached { .. }) {
            self.request_redraw();
        }
    }

    fn window_event(&mut self, el: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                el.exit();
            }
            WindowEvent::Resized(size) => {
                self.sched.size = (size.width, size.height);
                if let Some(b) = &mut self.backend {
                    b.configure_surface(size.width, size.height);
                }
                self.request_redraw();
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.set_scale(scale_factor);
                self.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                self.route(|r, f| r.pointer_moved(f, pos));
            }
            WindowEvent::CursorLeft { .. } => {
                if self.router.pointer_left() {
                    self.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => self.route(|r, f| r.press(f)),
                ElementState::Released => self.route(|r, f| r.release(f)),
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (-x * WHEEL_LINE_PX, -y * WHEEL_LINE_PX),
                    MouseScrollDelta::PixelDelta(lp) => (-(lp.x as f32), -(lp.y as f32)),
                };
                log::trace!("MouseWheel: dx={dx}, dy={dy}");
                self.route(|r, f| r.wheel(f, Vec2::new(dx, dy)));
            }
            WindowEvent::Touch(touch) => {
                let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                let slop = self.sched.locals.dp_to_px(TOUCH_SLOP_DP);
                match touch.phase {
                    TouchPhase::Started => self.route(|r, f| r.touch_start(f, touch.id, pos)),
                    TouchPhase::Moved => self.route(|r, f| r.touch_move(f, touch.id, pos, slop)),
                    TouchPhase::Ended => self.route(|r, f| r.touch_end(f, touch.id, pos)),
                    TouchPhase::Cancelled => {
                        if self.router.cancel() {
                            self.request_redraw();
                        }
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, el: &ActiveEventLoop) {
        if self.animating {
            self.request_redraw();
            el.set_control_flow(ControlFlow::Wait);
            return;
        }
        match self.options.idle_redraw {
            Some(every) => {
                let due = self.last_redraw + every;
                if Instant::now() >= due {
                    self.request_redraw();
                    el.set_control_flow(ControlFlow::Wait);
                } else {
                    el.set_control_flow(ControlFlow::WaitUntil(due));
                }
            }
            None => el.set_control_flow(ControlFlow::Wait),
        }
    }
}
