use depth_studio::DepthStudioApp;
use depth_studio::config::Settings;
use depth_studio::error::AppError;
use tracing::{Level, info};

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::load()?;
    init_logging(settings.log_level());
    info!("Starting depth studio");

    DepthStudioApp::start_gui(&settings)
}
