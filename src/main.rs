use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use tripforge::routes::{self, AppState};
use tripforge::services::composer::OpenAiComposer;
use tripforge::services::place_service::{Geocoder, KakaoLocalClient};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8000;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let composer = OpenAiComposer::from_env().expect("OPENAI_API_KEY must be set");
    let geocoder: Option<Arc<dyn Geocoder>> = match KakaoLocalClient::new() {
        Ok(client) => {
            println!("Kakao place lookup enabled");
            Some(Arc::new(client))
        }
        Err(err) => {
            println!(
                "Place lookup not available: {}. Plans are served without enrichment.",
                err
            );
            None
        }
    };
    let state = AppState {
        composer: Arc::new(composer),
        geocoder,
    };

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(web::Data::new(state.clone()))
            .route("/", web::get().to(routes::health::root))
            .route("/health", web::get().to(routes::health::health_check))
            .route("/plan-trip", web::post().to(routes::plan::plan_trip))
            .route(
                "/plan-trip-progress",
                web::get().to(routes::progress::plan_trip_progress),
            )
            .route(
                "/modify-trip-chat",
                web::post().to(routes::modify::modify_trip_chat),
            )
            .route("/hotel-links", web::get().to(routes::hotel::hotel_links))
    })
    .bind((host, port))?
    .run()
    .await
}
