use clap::Parser;

#[tokio::main]
async fn main() -> foodabot::error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("foodabot=info"))
        .init();
    log::info!("Starting foodabot");

    // reqwest and the RTM socket both pull in rustls; pin the process-wide provider.
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("rustls crypto provider already installed");
    }

    let cli = foodabot::Cli::parse();

    match foodabot::run(cli).await {
        Ok(_) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {}", e);
            Err(e)
        }
    }
}
