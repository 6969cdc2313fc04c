use log::LevelFilter;
use tally_platform::RunOptions;
use tally_platform::android::{AndroidApp, run_android_app};

use crate::CounterApp;

#[unsafe(no_mangle)]
pub extern "C" fn android_main(android_app: AndroidApp) {
    android_logger::init_once(android_logger::Config::default().with_max_level(LevelFilter::Debug));
    let root = CounterApp::new().into_root();
    if let Err(e) = run_android_app(android_app, RunOptions::default(), root) {
        log::error!("event loop exited with error: {e:?}");
    }
}
