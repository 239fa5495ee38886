#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = classquiz::run().await {
        eprintln!("classquiz fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
