use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    solmint_cli::run().await?;
    Ok(())
}
