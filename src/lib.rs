//! LMFDB Web Layer
//!
//! HTTP front end of a mathematical reference database: search and detail
//! pages for isogeny classes of abelian varieties over finite fields, and
//! detail, zero and plot endpoints for L-functions.
//!
//! # Overview
//!
//! A request is routed by [`server::route`]. Abelian-variety searches are
//! turned into a [`Query`] by the [`search`] parsers and run against a
//! [`DocumentStore`]. L-function URLs are mapped to an
//! [`LfunctionSource`](lfunction::source::LfunctionSource) by
//! [`generate_from_url`](lfunction::source::generate_from_url) and
//! constructed by an [`LfunctionBuilder`](lfunction::builder::LfunctionBuilder).
//! Pages are served as JSON contexts; zeros as HTML fragments; plots as PNG.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lmfdb_web::{AppState, JsonStore, Server, ServerConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> lmfdb_web::Result<()> {
//! let config = ServerConfig::from_file("lmfdb_web.yaml")?;
//! let store = JsonStore::load(&config.data_dir)?;
//! let server = Server::new(AppState::new(config, Arc::new(store)));
//! server.start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```yaml
//! listen_address: "127.0.0.1:37777"
//! data_dir: "data"                       # abvar_fq_isog.json, lfunctions.json
//! plot_dir: "~/data/lfunction_plots"     # <domain>.bin plot stores
//! search_page_size: 50
//! max_search_page_size: 1000
//! zero_search_time_limit_secs: 10
//! ```
//!
//! See [`ServerConfig`] for details.

pub mod config;
pub mod download;
pub mod error;
pub mod lfunction;
pub mod metrics;
pub mod metrics_endpoint;
pub mod models;
pub mod page;
pub mod plot;
pub mod polynomial;
pub mod search;
pub mod server;
pub mod spline;
pub mod store;

// Re-export commonly used types
pub use config::ServerConfig;
pub use download::{format_download, Dialect, DownloadFile};
pub use error::{BuildError, LmfdbError, Result};
pub use lfunction::{Descriptor, LType, Sign};
pub use metrics::{MetricsSnapshot, WebMetrics};
pub use models::{AbvarFqIsoclass, AbvarLabel, IsogenyClassRecord};
pub use plot::{PlotRenderer, PlotStore};
pub use search::{Args, Query};
pub use server::{AppState, Server};
pub use store::{DocumentStore, JsonStore};
