//! HTTP server and router
//!
//! One tokio task per connection, hyper's HTTP/1 connection driver and a
//! plain match-based router. Handlers run on the blocking pool since zero
//! searches and plotting are CPU bound.

use crate::config::ServerConfig;
use crate::download::{format_download, Dialect};
use crate::error::{LmfdbError, Result};
use crate::lfunction::builder::{CatalogBuilder, LfunctionBuilder};
use crate::lfunction::source::{generate_from_url, LfunctionSource, MAX_SEGMENTS};
use crate::lfunction::zeros::zeros_for;
use crate::lfunction::Descriptor;
use crate::metrics::{RouteKind, WebMetrics};
use crate::metrics_endpoint::{health_response, metrics_response};
use crate::models::{abvar_label, split_label, validate_label, AbvarFqIsoclass};
use crate::page::{
    lcalc_file, lfunction_error_page, AbvarClassPage, AbvarIndexPage, AbvarSearchPage,
    BrowseFamily, BrowsePage, DegreePage, LfunctionPage, LfunctionTopPage, SearchInputErrorPage,
};
use crate::plot::{PlotRenderer, PlotStore};
use crate::search::{abvar_query, parse_count, parse_start, Args, Pagination, Query};
use crate::store::{
    decode_isogeny_classes, find_isogeny_class, find_lfunctions, AbvarStats, DocumentStore,
    ABVAR_COLLECTION,
};
use bytes::Bytes;
use http::{Method, Response, StatusCode};
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};
use url::form_urlencoded;

/// Elliptic curve label with a trailing curve number, e.g. `11.a1`
static EC_CURVE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.[a-z]+)\d+$").expect("static regex"));

/// Shared state of the web server
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<dyn DocumentStore>,
    pub builder: Arc<dyn LfunctionBuilder>,
    pub plots: PlotRenderer,
    pub metrics: Arc<WebMetrics>,
}

impl AppState {
    /// State with the catalog builder and the configured plot store
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let metrics = Arc::new(WebMetrics::new());
        let plots = PlotRenderer::new(PlotStore::new(config.plot_path()), Arc::clone(&metrics));
        AppState {
            builder: Arc::new(CatalogBuilder::new(Arc::clone(&store))),
            config,
            store,
            plots,
            metrics,
        }
    }
}

/// The web server
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Server {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Bind the configured address and serve until the process ends
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self.state.config.listen_addr()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!("LMFDB web server listening on http://{}", listener.local_addr()?);

        loop {
            let (stream, _) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { handle_request(req, state).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle one HTTP request
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    let worker_state = Arc::clone(&state);
    let (m, p) = (method.clone(), path.clone());
    let response = tokio::task::spawn_blocking(move || {
        route(&worker_state, &m, &p, query.as_deref())
    })
    .await
    .unwrap_or_else(|e| {
        error!("handler for {} panicked: {}", path, e);
        error_response(&LmfdbError::InternalError(e.to_string()))
    });

    let status = response.status().as_u16();
    state.metrics.record_status(status);
    state.metrics.record_request_duration(started.elapsed());
    info!("{} {} -> {} ({:?})", method, path, status, started.elapsed());
    Ok(response)
}

/// Route a request to its handler
pub fn route(state: &AppState, method: &Method, path: &str, query: Option<&str>) -> Response<Full<Bytes>> {
    if method != Method::GET {
        return method_not_allowed();
    }
    let args = parse_query(query.unwrap_or(""));
    state.metrics.record_request(route_kind(path, &args));

    let result = if path == "/metrics" {
        Ok(metrics_response(&state.metrics))
    } else if path == "/health" {
        Ok(health_response())
    } else if path == "/" {
        json_response(&serde_json::json!({
            "sections": [
                ["L-functions", "/L/"],
                ["Abelian varieties over finite fields", "/abvar/fq/"],
            ]
        }))
    } else if path == "/EllipticCurves/Fq" || path == "/EllipticCurves/Fq/" {
        Ok(redirect("/abvar/fq/"))
    } else if path == "/L" {
        Ok(redirect("/L/"))
    } else if let Some(rest) = path.strip_prefix("/L/") {
        lfunction_routes(state, rest, query, &args)
    } else if let Some(rest) = path.strip_prefix("/abvar/fq") {
        abvar_routes(state, rest, args)
    } else {
        Ok(not_found())
    };

    result.unwrap_or_else(|e| {
        if e.to_http_status() >= 500 {
            error!("request for {} failed: {}", path, e);
        }
        error_response(&e)
    })
}

fn route_kind(path: &str, args: &Args) -> RouteKind {
    if path.starts_with("/L/Zeros/") {
        RouteKind::Zeros
    } else if path.starts_with("/L/Plot/") {
        RouteKind::Plot
    } else if path.starts_with("/abvar/fq") {
        if args.contains_key("download") {
            RouteKind::Download
        } else if !args.is_empty() || (path.ends_with('/') && path != "/abvar/fq/") {
            RouteKind::Search
        } else {
            RouteKind::Page
        }
    } else if path.starts_with("/L/") {
        RouteKind::Page
    } else {
        RouteKind::Other
    }
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Decode `%XY` escapes in a path segment
pub fn decode_segment(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into arguments; the first occurrence of a key wins
pub fn parse_query(query: &str) -> Args {
    let mut args = Args::new();
    for (k, v) in form_urlencoded::parse(query.as_bytes()) {
        args.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    args
}

/// Split the path below `/L/` into segments
///
/// A single trailing slash is dropped; inner empty segments are kept.
pub fn path_segments(rest: &str) -> Vec<String> {
    let trimmed = rest.strip_suffix('/').unwrap_or(rest);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(|s| decode_segment(s)).collect()
}

// ---------------------------------------------------------------------------
// L-functions
// ---------------------------------------------------------------------------

/// Canonical location for an L-function URL that has one
pub fn lfunction_redirect(segments: &[String]) -> Option<String> {
    let s: Vec<&str> = segments.iter().map(String::as_str).collect();
    match s.as_slice() {
        ["Character", "Dirichlet", "1", "1"] | ["NumberField", "1.1.1.1"] => {
            Some("/L/Riemann/".to_string())
        }
        ["EllipticCurve", "Q", label] => EC_CURVE_LABEL
            .captures(label)
            .map(|caps| format!("/L/EllipticCurve/Q/{}/", &caps[1])),
        ["ModularForm", "GL2", "Q", "holomorphic", level, weight] => Some(format!(
            "/L/ModularForm/GL2/Q/holomorphic/{}/{}/0/a/0/",
            level, weight
        )),
        ["ModularForm", "GL2", "Q", "holomorphic", level, weight, character] => Some(format!(
            "/L/ModularForm/GL2/Q/holomorphic/{}/{}/{}/a/0/",
            level, weight, character
        )),
        ["ModularForm", "GL2", "Q", "holomorphic", level, weight, character, label] => {
            Some(format!(
                "/L/ModularForm/GL2/Q/holomorphic/{}/{}/{}/{}/0/",
                level, weight, character, label
            ))
        }
        ["ModularForm", "GL2", "TotallyReal", field, "holomorphic", label] => Some(format!(
            "/L/ModularForm/GL2/TotallyReal/{}/holomorphic/{}/0/0/",
            field, label
        )),
        ["ModularForm", "GL2", "TotallyReal", field, "holomorphic", label, character] => {
            Some(format!(
                "/L/ModularForm/GL2/TotallyReal/{}/holomorphic/{}/{}/0/",
                field, label, character
            ))
        }
        ["ModularForm", "GSp", "Q", "Sp4Z", "specimen", weight, orbit, number] => Some(format!(
            "/L/ModularForm/GSp/Q/Sp4Z/{}/{}/{}/",
            weight, orbit, number
        )),
        _ => None,
    }
}

fn lfunction_routes(state: &AppState, rest: &str, query: Option<&str>, args: &Args) -> Result<Response<Full<Bytes>>> {
    let segments = path_segments(rest);
    let Some(first) = segments.first() else {
        return json_response(&LfunctionTopPage::default());
    };

    if first.starts_with("degree") {
        if segments.len() == 1 {
            return match DegreePage::from_segment(first) {
                Some(page) => json_response(&page),
                None => Ok(not_found()),
            };
        }
        return match BrowseFamily::from_segments(&segments) {
            Some(family) => browse_page(state, &family),
            None => Ok(not_found()),
        };
    }

    if first == "Zeros" || first == "Plot" {
        let inner = &segments[1..];
        let (source, desc) = match build_lfunction(state, inner, args) {
            Ok(built) => built,
            Err(response) => return Ok(response),
        };
        return if first == "Zeros" {
            Ok(zeros_fragment(state, &desc))
        } else {
            plot_png(state, &source, &desc)
        };
    }

    if let Some(location) = lfunction_redirect(&segments) {
        debug!("redirecting /L/{} to {}", rest, location);
        return Ok(redirect(&location));
    }

    let (source, desc) = match build_lfunction(state, &segments, args) {
        Ok(built) => built,
        Err(response) => return Ok(response),
    };

    let request_url = match query {
        Some(q) if !q.is_empty() => format!("/L/{}?{}", rest, q),
        _ => format!("/L/{}", rest),
    };
    if args.get("download").map(String::as_str) == Some("lcalcfile") {
        return Ok(text_response(lcalc_file(&desc, &request_url)));
    }

    let page_args = args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let has_cached_plot = source.plot_store_key().is_some();
    json_response(&LfunctionPage::new(&desc, has_cached_plot, &request_url, page_args))
}

fn browse_page(state: &AppState, family: &BrowseFamily) -> Result<Response<Full<Bytes>>> {
    let records = find_lfunctions(state.store.as_ref(), &family.query())?;
    if records.is_empty() && family.require_contents {
        return Ok(not_found());
    }
    json_response(&BrowsePage::new(family, records))
}

/// Dispatch and construct, or the response to send instead
fn build_lfunction(
    state: &AppState,
    segments: &[String],
    args: &Args,
) -> std::result::Result<(LfunctionSource, Descriptor), Response<Full<Bytes>>> {
    if segments.len() > MAX_SEGMENTS {
        return Err(not_found());
    }
    let Some(source) = generate_from_url(segments, args) else {
        return Err(not_found());
    };
    match state.builder.build(&source) {
        Ok(desc) => Ok((source, desc)),
        Err(e) if e.is_recoverable() => {
            warn!("unable to construct L-function {:?}: {}", source, e);
            state.metrics.record_construction_error();
            Err(html_response(lfunction_error_page(&e.render_html())))
        }
        Err(e) => {
            error!("defect while constructing {:?}: {}", source, e);
            state.metrics.record_construction_error();
            Err(error_response(&LmfdbError::from(e)))
        }
    }
}

fn zeros_fragment(state: &AppState, desc: &Descriptor) -> Response<Full<Bytes>> {
    if desc.stored_zeros.is_none() && !desc.from_db && desc.numeric.is_some() {
        state.metrics.record_computed_zeros();
    }
    let time_allowed = Duration::from_secs(state.config.zero_search_time_limit_secs);
    html_response(zeros_for(desc, time_allowed))
}

fn plot_png(state: &AppState, source: &LfunctionSource, desc: &Descriptor) -> Result<Response<Full<Bytes>>> {
    let cached = source.plot_store_key();
    let cached_ref = cached.as_ref().map(|(domain, condition)| (*domain, condition.as_str()));
    match state.plots.render(cached_ref, desc)? {
        Some(png) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "image/png")
            .body(Full::new(Bytes::from(png)))
            .unwrap()),
        None => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Abelian varieties over finite fields
// ---------------------------------------------------------------------------

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn abvar_routes(state: &AppState, rest: &str, mut args: Args) -> Result<Response<Full<Bytes>>> {
    if rest.is_empty() {
        return Ok(redirect("/abvar/fq/"));
    }
    let Some(rest) = rest.strip_prefix('/') else {
        return Ok(not_found());
    };

    if rest.is_empty() {
        return if args.is_empty() {
            abvar_index(state)
        } else {
            abvar_search(state, args)
        };
    }

    let trailing_slash = rest.ends_with('/');
    let parts: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
    match (parts.as_slice(), trailing_slash) {
        ([g], true) if is_number(g) => {
            args.entry("g".to_string()).or_insert_with(|| g.to_string());
            abvar_search(state, args)
        }
        ([g, q], true) if is_number(g) && is_number(q) => {
            args.entry("g".to_string()).or_insert_with(|| g.to_string());
            args.entry("q".to_string()).or_insert_with(|| q.to_string());
            abvar_search(state, args)
        }
        ([g, q, iso], false) if is_number(g) && is_number(q) => abvar_class(state, g, q, iso),
        ([label], false) => Ok(abvar_by_label(&decode_segment(label))),
        _ => Ok(not_found()),
    }
}

fn abvar_index(state: &AppState) -> Result<Response<Full<Bytes>>> {
    let stats = AbvarStats::compute(state.store.as_ref())?;
    json_response(&AbvarIndexPage::new(&stats))
}

fn abvar_search(state: &AppState, args: Args) -> Result<Response<Full<Bytes>>> {
    if args.get("download").is_some_and(|d| d != "0") {
        return abvar_download(state, &args);
    }
    if args.contains_key("jump") {
        return Ok(abvar_by_label(args.get("label").map_or("", String::as_str)));
    }

    let query = match abvar_query(&args) {
        Ok(query) => query,
        Err(e) => return Ok(search_input_error(vec![e.flash_message()])),
    };
    debug!("abelian variety search filter: {:?}", query);

    let count = parse_count(
        &args,
        state.config.search_page_size,
        state.config.max_search_page_size,
    );
    let number = state.store.count(ABVAR_COLLECTION, &query)?;
    let pagination = Pagination::new(parse_start(&args), count, number);
    let docs = state
        .store
        .find(ABVAR_COLLECTION, &query, pagination.start, pagination.count)?;
    let abvars = decode_isogeny_classes(docs)?
        .iter()
        .map(AbvarFqIsoclass::new)
        .collect();

    json_response(&AbvarSearchPage::new(abvars, pagination, query.to_stored()?))
}

fn abvar_by_label(label: &str) -> Response<Full<Bytes>> {
    let label = label.replace(' ', "");
    if let Err(e) = validate_label(&label) {
        return search_input_error(vec![e.flash_message()]);
    }
    match split_label(&label) {
        Some((g, q, iso)) => redirect(&format!("/abvar/fq/{}/{}/{}", g, q, iso)),
        None => search_input_error(vec![
            LmfdbError::invalid_label(label.as_str(), "unparseable").flash_message(),
        ]),
    }
}

fn abvar_class(state: &AppState, g: &str, q: &str, iso: &str) -> Result<Response<Full<Bytes>>> {
    let label = abvar_label(g, q, &decode_segment(iso));
    if let Err(e) = validate_label(&label) {
        return Ok(search_input_error(vec![e.flash_message()]));
    }
    match find_isogeny_class(state.store.as_ref(), &label)? {
        Some(record) => json_response(&AbvarClassPage::new(AbvarFqIsoclass::new(&record))),
        None => Ok(search_input_error(vec![
            LmfdbError::NotInDatabase(label).flash_message()
        ])),
    }
}

fn abvar_download(state: &AppState, args: &Args) -> Result<Response<Full<Bytes>>> {
    let dialect = Dialect::from_tag(args.get("Submit").map_or("gp", String::as_str));
    let query = match args.get("query") {
        Some(stored) => Query::from_stored(stored),
        None => abvar_query(args),
    };
    let query = match query {
        Ok(query) => query,
        Err(e) => return Ok(search_input_error(vec![e.flash_message()])),
    };

    let number = state.store.count(ABVAR_COLLECTION, &query)?;
    let docs = state.store.find(ABVAR_COLLECTION, &query, 0, number)?;
    let polynomials: Vec<Vec<i64>> = decode_isogeny_classes(docs)?
        .into_iter()
        .map(|record| record.polynomial)
        .collect();

    let file = format_download(&polynomials, dialect, chrono::Local::now().date_naive());
    info!("downloading {} Weil polynomials as {}", polynomials.len(), file.filename);
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Disposition", file.content_disposition())
        .body(Full::new(Bytes::from(file.content)))
        .unwrap())
}

fn search_input_error(flash: Vec<String>) -> Response<Full<Bytes>> {
    json_response(&SearchInputErrorPage::new(flash)).unwrap_or_else(|e| error_response(&e))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(page: &T) -> Result<Response<Full<Bytes>>> {
    let body = serde_json::to_vec(page)?;
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap())
}

fn html_response(body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn text_response(body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn redirect(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header("Location", location)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn not_found() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("404 Not Found")))
        .unwrap()
}

fn method_not_allowed() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Allow", "GET")
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap()
}

fn error_response(err: &LmfdbError) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(err.to_http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from(err.to_string())))
        .unwrap()
}
