#[tokio::main]
async fn main() {
    if let Err(e) = translator_session_lib::run().await {
        eprintln!("translator-session: {}", e);
        std::process::exit(1);
    }
}
