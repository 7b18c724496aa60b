#[tokio::main]
async fn main() {
    if let Err(e) = ladle::run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
