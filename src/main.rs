use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    sweeper_cli::cli::run().await
}
