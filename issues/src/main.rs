use std::sync::Arc;

use actix_web::HttpServer;
use common::{
    config::{DATABASE_MAX_CONNECTIONS, DATABASE_URL, HOST, PORT},
    context::ServiceState,
    repository::{MemoryRepository, RepositoryObject, SqlRepository},
};
use issues::create_app;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    env_logger::init();

    let repository: RepositoryObject = match DATABASE_URL.as_deref() {
        Some(url) => {
            log::info!("Using SQL issue store at {}", url);
            let repository = SqlRepository::connect(url, *DATABASE_MAX_CONNECTIONS)
                .await
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;
            Arc::new(repository)
        }
        None => {
            log::warn!("DATABASE_URL is not set, issues are kept in memory only");
            Arc::new(MemoryRepository::new())
        }
    };

    let mut state = ServiceState::new("issues".to_string());
    state.insert(repository);
    let state = Arc::new(state);

    log::info!("Starting {} service on {}:{}", state.service_name, *HOST, *PORT);

    HttpServer::new(move || create_app(state.clone()))
        .bind((HOST.as_str(), *PORT))?
        .run()
        .await
}
