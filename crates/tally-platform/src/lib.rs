//! Platform runners (desktop via winit; Android via native-activity)
//!
//! A runner owns the window, the renderer and a [`PointerRouter`]. Each
//! redraw it calls the app's root function with the current [`Scheduler`],
//! lays the returned view out and hands the scene to the backend.

mod common;
#[cfg(any(feature = "desktop", feature = "android"))]
mod runner;

pub use common::{PointerRouter, TOUCH_SLOP_DP, WHEEL_LINE_PX};

use std::time::Duration;

/// Window and redraw settings shared by the runners.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub title: String,
    /// Initial inner size in logical pixels. Ignored on Android.
    pub size: (u32, u32),
    /// Redraw this often while idle so time-dependent text stays current.
    /// `None` redraws only on input and while scrolling animates.
    pub idle_redraw: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            title: "Tally".into(),
            size: (420, 720),
            idle_redraw: Some(Duration::from_secs(1)),
        }
    }
}

#[cfg(feature = "desktop")]
pub fn run_desktop_app(
    options: RunOptions,
    root: impl FnMut(&tally_core::Scheduler) -> tally_core::View + 'static,
) -> anyhow::Result<()> {
    let event_loop = winit::event_loop::EventLoop::new()?;
    let mut app = runner::App::new(options, Box::new(root));
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(all(feature = "android", target_os = "android"))]
pub mod android {
    use super::*;
    use winit::event_loop::EventLoop;
    use winit::platform::android::EventLoopBuilderExtAndroid;

    pub use winit::platform::android::activity::AndroidApp;

    pub fn run_android_app(
        app: AndroidApp,
        options: RunOptions,
        root: impl FnMut(&tally_core::Scheduler) -> tally_core::View + 'static,
    ) -> anyhow::Result<()> {
        let event_loop = EventLoop::builder().with_android_app(app).build()?;
        let mut state = runner::App::new(options, Box::new(root));
        event_loop.run_app(&mut state)?;
        Ok(())
    }
}
