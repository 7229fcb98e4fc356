mod cli;

use std::process::ExitCode;

use clap::Parser;
use keel_core::kernel::Kernel;
use keel_core::kernel::error::Result;
use log::{error, info};

use cli::{CliArgs, Commands};
use core_logging::LoggingPlugin;
use widgets_plugin::WidgetsPlugin;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &CliArgs) -> Result<()> {
    let config = args.configuration()?;
    let mut kernel = Kernel::with_configuration(config);

    // --- Statically Register Plugins ---
    kernel.register_plugin(LoggingPlugin)?;
    kernel.register_plugin(WidgetsPlugin)?;

    kernel.bootstrap().await?;
    info!(
        "Bootstrapped {} plugin(s), {} resource(s)",
        kernel.plugins().plugin_count(),
        kernel.resource_names().len()
    );

    match args.command() {
        Commands::Serve => kernel.serve().await,
        Commands::Check => {
            println!(
                "Bootstrap OK: {} plugin(s), {} route(s), databases: {}",
                kernel.plugins().plugin_count(),
                kernel.route_paths().len(),
                kernel.database_names().join(", ")
            );
            Ok(())
        }
        Commands::Routes => {
            for path in kernel.route_paths() {
                println!("{path}");
            }
            Ok(())
        }
        Commands::Migrate => {
            kernel.migrate()?;
            println!("Migration complete");
            Ok(())
        }
    }
}
