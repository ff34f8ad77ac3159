use dotenv::dotenv;

use card_offers::context;

mod cli;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match context::load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Unable to load config: {}", err);
            std::process::exit(1);
        }
    };

    let mut session = cli::Session::load(config).await;
    if let Err(err) = cli::main(&mut session).await {
        eprintln!("{}", err);
    }
}
