use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tokio::net::TcpListener;
use tracing::{error, warn};
use warp::fs::File;
use warp::http::{HeaderValue, Method, StatusCode, header};
use warp::reject::MethodNotAllowed;
use warp::reply::Response as WarpResponse;
use warp::{Filter, Rejection, Reply};

use crate::Config;
use crate::config::DOCUMENT_NAME;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, OPTIONS";
const ALLOW_HEADERS: &str = "*";

#[derive(Debug, Clone)]
pub struct AppState {
    site_dir: PathBuf,
}

impl AppState {
    pub fn new(site_dir: PathBuf) -> Self {
        Self { site_dir }
    }

    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let serve_options = config
        .serve_options()
        .cloned()
        .ok_or_else(|| anyhow!("server mode requires serve options"))?;

    let state = Arc::new(AppState::new(config.site_dir.clone()));
    let routes = routes(state);

    let addr_tuple = (serve_options.bind, serve_options.port);
    let listener = TcpListener::bind(addr_tuple)
        .await
        .with_context(|| format!("failed to bind {}:{}", addr_tuple.0, addr_tuple.1))?;
    let listening_addr = listener.local_addr()?;
    let server_future = warp::serve(routes)
        .incoming(listener)
        .graceful(shutdown_future())
        .run();

    let url = browse_url(listening_addr);
    println!(
        "Serving {} at http://{}:{}/",
        config.site_dir.display(),
        listening_addr.ip(),
        listening_addr.port()
    );
    println!("Press Ctrl+C to stop the server");

    if serve_options.open_browser {
        if let Err(err) = open::that(&url) {
            warn!(%err, "could not open a browser; visit {url}");
        }
    }

    server_future.await;
    println!("Server stopped.");
    Ok(())
}

async fn shutdown_future() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        eprintln!("Failed to listen for shutdown signal: {err}");
    }
}

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (WarpResponse,), Error = Infallible> + Clone {
    // Not `warp::options()`: its MethodNotAllowed would mask a 404 from the file route.
    let preflight_route = warp::method().and_then(|method: Method| async move {
        if method == Method::OPTIONS {
            Ok(WarpResponse::new(String::new().into()))
        } else {
            Err(warp::reject::not_found())
        }
    });

    let file_route =
        warp::fs::dir(state.site_dir().to_path_buf()).map(|file: File| file.into_response());

    preflight_route
        .or(file_route)
        .unify()
        .recover(handle_rejection)
        .unify()
        .map(with_cors)
}

fn with_cors(mut response: WarpResponse) -> WarpResponse {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}

async fn handle_rejection(rejection: Rejection) -> Result<WarpResponse, Infallible> {
    let response = if rejection.is_not_found() {
        plain_response(StatusCode::NOT_FOUND, "Not Found")
    } else if rejection.find::<MethodNotAllowed>().is_some() {
        plain_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    } else {
        error!(?rejection, "unhandled rejection");
        plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    };
    Ok(response)
}

fn plain_response(status: StatusCode, body: &str) -> WarpResponse {
    let mut response = WarpResponse::new(body.to_string().into());
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// URL to hand to the browser. A wildcard bind is reachable as `localhost`.
fn browse_url(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        format!("http://localhost:{}/{DOCUMENT_NAME}", addr.port())
    } else {
        format!("http://{addr}/{DOCUMENT_NAME}")
    }
}
