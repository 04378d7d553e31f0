use mazurka_api::App;
use mazurka_api::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let app = App::new();
    app.run().await?;

    Ok(())
}
