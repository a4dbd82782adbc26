use std::path::Path;
use std::sync::Arc;

use ftb_core::{config::Config, version};

#[tokio::main]
async fn main() -> Result<(), ftb_core::Error> {
    ftb_core::logging::init("ftb")?;

    println!("ftb version: {}", version::git_version(Path::new(".")));

    let cfg = Arc::new(Config::load()?);

    ftb_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| ftb_core::Error::Platform(format!("telegram bot failed: {e}")))?;

    Ok(())
}
