use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    pokedex_cli::main_entry().await
}
