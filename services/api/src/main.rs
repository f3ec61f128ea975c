use credit_engine_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("credit approval service error: {err}");
        std::process::exit(1);
    }
}
