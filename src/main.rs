use log::{error, info};
use transcap::configuration::config::Config;
use transcap::controller::controller_handler::Controller;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    println!(
        "
████████╗██████╗  █████╗ ███╗   ██╗███████╗ ██████╗ █████╗ ██████╗
╚══██╔══╝██╔══██╗██╔══██╗████╗  ██║██╔════╝██╔════╝██╔══██╗██╔══██╗
   ██║   ██████╔╝███████║██╔██╗ ██║███████╗██║     ███████║██████╔╝
   ██║   ██╔══██╗██╔══██║██║╚██╗██║╚════██║██║     ██╔══██║██╔═══╝
   ██║   ██║  ██║██║  ██║██║ ╚████║███████║╚██████╗██║  ██║██║
   ╚═╝   ╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═══╝╚══════╝ ╚═════╝╚═╝  ╚═╝╚═╝
===================================================================
            Caption capture and transcript store v0.1.0
===================================================================
"
    );

    info!("Loading configuration");

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded");

    let mut controller = match Controller::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Unable to create a controller instance: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    let result = tokio::spawn(async move {
        info!("Spawning the controller");
        if let Err(e) = controller.run().await {
            error!("Error occurred in the controller process: {}, exiting...", e);
            std::process::exit(1);
        }
    });

    if let Err(e) = result.await {
        error!("Error joining at the end of execution: {}", e);
        std::process::exit(1);
    }
}
