use clap::Parser;

use ipgeo::cli::{Cli, Commands};
use ipgeo::config::AppConfig;
use ipgeo::errors::IpGeoError;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig { output_path }) = &cli.command {
        let path = output_path.as_deref().unwrap_or("config.example.toml");
        if let Err(e) = AppConfig::default().save_to_file(path) {
            exit_with(&e);
        }
        println!("Sample configuration written to {}", path);
        return Ok(());
    }

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let _guard = match ipgeo::system::init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => exit_with(&e),
    };

    ipgeo::runtime::run_server(config).await
}

fn exit_with(err: &IpGeoError) -> ! {
    eprintln!("{}", err.format_colored());
    std::process::exit(1);
}
