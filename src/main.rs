use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use llama_chat_api::model::{ChatModel, OllamaClient};
use llama_chat_api::web::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting LLaMA chat API");

    // Initialize the client for the Ollama backend
    let client = match OllamaClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize Ollama client: {}", e);
            std::process::exit(1);
        }
    };
    let model: Data<dyn ChatModel> = Data::from(Arc::new(client) as Arc<dyn ChatModel>);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    info!("Listening on {}:{}", host, port);

    // Start web server
    HttpServer::new(move || {
        App::new()
            .app_data(model.clone())
            .wrap(Cors::permissive())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
