mod frame_timer;
mod keymap;
mod viewer;

use fractaldive_core::ViewerConfig;
use std::path::PathBuf;
use viewer::AppError;

fn run() -> Result<(), AppError> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = ViewerConfig::load(config_path.as_deref())?;
    viewer::run(config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
