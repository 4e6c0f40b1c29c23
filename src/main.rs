mod config;
mod generate;
mod process;
mod version;

use anyhow::Result;

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let config = Config::parse_args();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let version = version::build_version_string(config.repo_dir.as_deref()).await;
    tracing::debug!("stamping version: {}", version);

    generate::write_version_file(&config.out, &config.package, &version)?;

    Ok(())
}
