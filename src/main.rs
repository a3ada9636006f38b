#[actix_web::main]
async fn main() {
    if let Err(err) = dealerdesk_lib::run().await {
        eprintln!("dealerdesk failed to start: {}", err);
        std::process::exit(1);
    }
}
