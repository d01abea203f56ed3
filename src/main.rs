use biportal::app;
use log::warn;
use std::env;

/// Default listening port when `PORT` is unset
const DEFAULT_PORT: u16 = 5000;

/// Main entry point for the portal
///
/// Reads the listening port from the `PORT` environment variable and starts
/// the web server; all other configuration is compiled in.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let port = match env::var("PORT") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            warn!("PORT={} is not a valid port, using {}", value, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    };

    app::run(port).await
}
