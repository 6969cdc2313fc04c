use tally_app::CounterApp;
use tally_platform::{RunOptions, run_desktop_app};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("starting tally-counter");
    run_desktop_app(
        RunOptions {
            title: "Tally Counter".into(),
            ..RunOptions::default()
        },
        CounterApp::new().into_root(),
    )
}
