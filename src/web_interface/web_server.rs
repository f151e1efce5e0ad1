use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use log::info;
use rust_embed::RustEmbed;
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::auth::handle_rejection;
use super::routes;
use crate::error_handling::types::WebError;
use crate::storage::storage_trait::TranscriptStore;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Assets;

/// Web server for the HTTP API and dashboard.
pub struct WebServer {
    store: Arc<dyn TranscriptStore>,
    api_token: Option<String>,
}

impl WebServer {
    pub fn new(store: Arc<dyn TranscriptStore>, api_token: Option<String>) -> Self {
        Self { store, api_token }
    }

    /// Starts the web server on the given address and port.
    pub async fn start(&self, bind_address: IpAddr, port: u16) -> Result<(), WebError> {
        let routes = build_routes(self.store.clone(), self.api_token.clone());
        let addr: SocketAddr = (bind_address, port).into();
        info!("web interface listening on {}", addr);
        warp::serve(routes).run(addr).await;
        Ok(())
    }
}

/// Composes the full route tree.
///
/// Preflight sits first so every `OPTIONS` request is answered permissively
/// before auth is consulted. The search route precedes the id route, which
/// would otherwise swallow "search" as a video id. CORS headers are applied
/// to every reply, error replies included.
pub fn build_routes(
    store: Arc<dyn TranscriptStore>,
    token: Option<String>,
) -> impl Filter<Extract = impl Reply, Error = std::convert::Infallible> + Clone {
    let preflight = warp::options().map(|| StatusCode::NO_CONTENT);

    let api = routes::init_route(store.clone(), token.clone())
        .or(routes::save_route(store.clone(), token.clone()))
        .or(routes::list_route(store.clone(), token.clone()))
        .or(routes::search_route(store.clone(), token.clone()))
        .or(routes::get_route(store.clone(), token.clone()))
        .or(routes::delete_route(store.clone(), token.clone()))
        .or(routes::stats_route(store.clone(), token.clone()))
        .or(routes::export_route(store.clone(), token.clone()))
        .or(routes::import_route(store, token));

    preflight
        .or(dashboard_route())
        .or(assets_route())
        .or(api)
        .recover(handle_rejection)
        .with(warp::reply::with::header(
            "Access-Control-Allow-Origin",
            "*",
        ))
        .with(warp::reply::with::header(
            "Access-Control-Allow-Methods",
            "GET, POST, DELETE, OPTIONS",
        ))
        .with(warp::reply::with::header(
            "Access-Control-Allow-Headers",
            "Authorization, Content-Type",
        ))
        .with(warp::log("transcap::web"))
}

/// GET / -> dashboard
fn dashboard_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path::end().and(warp::get()).map(|| {
        match Assets::get("index.html") {
            Some(content) => {
                reply::html(String::from_utf8_lossy(content.data.as_ref()).into_owned())
                    .into_response()
            }
            None => reply::html("<h1>transcap is running</h1>".to_string()).into_response(),
        }
    })
}

/// GET /assets/:path -> embedded static files
fn assets_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("assets")
        .and(warp::get())
        .and(warp::path::tail())
        .map(|tail: warp::path::Tail| match Assets::get(tail.as_str()) {
            Some(content) => {
                let mime = mime_guess::from_path(tail.as_str()).first_or_octet_stream();
                reply::with_header(
                    content.data.into_owned(),
                    "Content-Type",
                    mime.to_string(),
                )
                .into_response()
            }
            None => StatusCode::NOT_FOUND.into_response(),
        })
}
