use clap::Parser;
use lidarview_window::{Args, ViewerConfig};

fn main() {
    let config = ViewerConfig::from(Args::parse());

    if let Err(err) = lidarview_window::run(config) {
        tracing::error!("lidarview failed: {err}");
        eprintln!("lidarview failed: {err}");
        std::process::exit(1);
    }
}
