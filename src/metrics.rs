//! Request metrics for the web layer
//!
//! Prometheus counters held in a registry owned by each [`WebMetrics`]. They
//! track requests per route family, plot paths taken and zero computations.

use prometheus::{Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::time::Duration;

/// Kind of request, as counted in the metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Page,
    Search,
    Download,
    Plot,
    Zeros,
    Other,
}

/// Metrics collector for the web server
///
/// Counters are atomic, so recording is thread-safe.
#[derive(Clone)]
pub struct WebMetrics {
    registry: Registry,

    // Request statistics
    total_requests: IntCounter,
    page_requests: IntCounter,
    search_requests: IntCounter,
    download_requests: IntCounter,
    plot_requests: IntCounter,
    zero_requests: IntCounter,

    // Response statistics
    not_found: IntCounter,
    construction_errors: IntCounter,
    server_errors: IntCounter,

    // Plot statistics
    cached_plots: IntCounter,
    direct_plots: IntCounter,
    plot_store_misses: IntCounter,

    // Zero statistics
    computed_zero_sets: IntCounter,

    // Latency
    request_duration_seconds: Histogram,

    // Derived, refreshed on gather
    plot_cache_rate: Gauge,
    avg_request_duration_ms: Gauge,
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub page_requests: u64,
    pub search_requests: u64,
    pub download_requests: u64,
    pub plot_requests: u64,
    pub zero_requests: u64,
    pub not_found: u64,
    pub construction_errors: u64,
    pub server_errors: u64,
    pub cached_plots: u64,
    pub direct_plots: u64,
    pub plot_store_misses: u64,
    pub computed_zero_sets: u64,
    pub total_request_duration_us: u64,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, prometheus::Error> {
    let counter = IntCounter::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge, prometheus::Error> {
    let gauge = Gauge::with_opts(Opts::new(name, help))?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

impl WebMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metrics registered in `registry`
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let r = &registry;
        let request_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "lmfdb_web_request_duration_seconds",
                "Duration of request handling in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;
        r.register(Box::new(request_duration_seconds.clone()))?;

        Ok(WebMetrics {
            total_requests: counter(r, "lmfdb_web_requests_total", "Total number of requests processed")?,
            page_requests: counter(
                r,
                "lmfdb_web_page_requests_total",
                "Number of L-function and isogeny class page requests",
            )?,
            search_requests: counter(r, "lmfdb_web_search_requests_total", "Number of abelian variety searches")?,
            download_requests: counter(
                r,
                "lmfdb_web_download_requests_total",
                "Number of search result downloads",
            )?,
            plot_requests: counter(r, "lmfdb_web_plot_requests_total", "Number of L-function plot requests")?,
            zero_requests: counter(
                r,
                "lmfdb_web_zero_requests_total",
                "Number of L-function zero list requests",
            )?,
            not_found: counter(r, "lmfdb_web_not_found_total", "Number of 404 responses")?,
            construction_errors: counter(
                r,
                "lmfdb_web_construction_errors_total",
                "Number of L-functions that could not be constructed",
            )?,
            server_errors: counter(r, "lmfdb_web_server_errors_total", "Number of 5xx responses")?,
            cached_plots: counter(
                r,
                "lmfdb_web_cached_plots_total",
                "Number of plots drawn from the plot store",
            )?,
            direct_plots: counter(
                r,
                "lmfdb_web_direct_plots_total",
                "Number of plots computed from the L-function",
            )?,
            plot_store_misses: counter(
                r,
                "lmfdb_web_plot_store_misses_total",
                "Number of plot store lookups that fell back to direct plotting",
            )?,
            computed_zero_sets: counter(
                r,
                "lmfdb_web_computed_zero_sets_total",
                "Number of zero lists computed on the fly",
            )?,
            request_duration_seconds,
            plot_cache_rate: gauge(
                r,
                "lmfdb_web_plot_cache_rate",
                "Percentage of plots served from the plot store",
            )?,
            avg_request_duration_ms: gauge(
                r,
                "lmfdb_web_request_duration_ms_avg",
                "Average request duration in milliseconds",
            )?,
            registry,
        })
    }

    /// Record a request of the given kind
    pub fn record_request(&self, kind: RouteKind) {
        self.total_requests.inc();
        let counter = match kind {
            RouteKind::Page => &self.page_requests,
            RouteKind::Search => &self.search_requests,
            RouteKind::Download => &self.download_requests,
            RouteKind::Plot => &self.plot_requests,
            RouteKind::Zeros => &self.zero_requests,
            RouteKind::Other => return,
        };
        counter.inc();
    }

    /// Record the status code sent back
    pub fn record_status(&self, status: u16) {
        if status == 404 {
            self.not_found.inc();
        } else if status >= 500 {
            self.server_errors.inc();
        }
    }

    /// Record an L-function that could not be constructed from its URL
    pub fn record_construction_error(&self) {
        self.construction_errors.inc();
    }

    /// Record a rendered plot
    ///
    /// # Arguments
    /// * `cached` - Whether the plot came from the precomputed plot store
    pub fn record_plot(&self, cached: bool) {
        if cached {
            self.cached_plots.inc();
        } else {
            self.direct_plots.inc();
        }
    }

    /// Record a lookup in the plot store that fell through to the direct path
    pub fn record_plot_store_miss(&self) {
        self.plot_store_misses.inc();
    }

    /// Record zeros computed on the fly
    pub fn record_computed_zeros(&self) {
        self.computed_zero_sets.inc();
    }

    pub fn record_request_duration(&self, duration: Duration) {
        self.request_duration_seconds.observe(duration.as_secs_f64());
    }

    /// Get a snapshot of current metrics
    ///
    /// Counters are read independently, so a snapshot taken under load may
    /// not be perfectly consistent across fields.
    pub fn get_stats(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.get(),
            page_requests: self.page_requests.get(),
            search_requests: self.search_requests.get(),
            download_requests: self.download_requests.get(),
            plot_requests: self.plot_requests.get(),
            zero_requests: self.zero_requests.get(),
            not_found: self.not_found.get(),
            construction_errors: self.construction_errors.get(),
            server_errors: self.server_errors.get(),
            cached_plots: self.cached_plots.get(),
            direct_plots: self.direct_plots.get(),
            plot_store_misses: self.plot_store_misses.get(),
            computed_zero_sets: self.computed_zero_sets.get(),
            total_request_duration_us: (self.request_duration_seconds.get_sample_sum() * 1e6).round() as u64,
        }
    }

    /// Collect every metric family, with the derived gauges brought up to date
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        let snapshot = self.get_stats();
        self.plot_cache_rate.set(snapshot.plot_cache_rate());
        self.avg_request_duration_ms.set(snapshot.avg_request_duration_ms());
        self.registry.gather()
    }
}

impl Default for WebMetrics {
    fn default() -> Self {
        Self::with_registry(Registry::new()).expect("Failed to create web metrics")
    }
}

impl MetricsSnapshot {
    /// Share of plots served from the plot store, as a percentage
    pub fn plot_cache_rate(&self) -> f64 {
        let total = self.cached_plots + self.direct_plots;
        if total == 0 {
            0.0
        } else {
            (self.cached_plots as f64 / total as f64) * 100.0
        }
    }

    /// Average request duration in milliseconds
    pub fn avg_request_duration_ms(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.total_request_duration_us as f64 / self.total_requests as f64) / 1000.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_requests_by_kind() {
        let metrics = WebMetrics::new();

        metrics.record_request(RouteKind::Page);
        metrics.record_request(RouteKind::Page);
        metrics.record_request(RouteKind::Zeros);
        metrics.record_request(RouteKind::Other);

        let stats = metrics.get_stats();
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.page_requests, 2);
        assert_eq!(stats.zero_requests, 1);
        assert_eq!(stats.plot_requests, 0);
    }

    #[test]
    fn test_record_status() {
        let metrics = WebMetrics::new();
        metrics.record_status(200);
        metrics.record_status(404);
        metrics.record_status(500);
        metrics.record_status(503);

        let stats = metrics.get_stats();
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.server_errors, 2);
    }

    #[test]
    fn test_plot_cache_rate() {
        let metrics = WebMetrics::new();
        assert_eq!(metrics.get_stats().plot_cache_rate(), 0.0);

        metrics.record_plot(true);
        metrics.record_plot(false);
        metrics.record_plot(false);
        metrics.record_plot(false);
        metrics.record_plot_store_miss();

        let stats = metrics.get_stats();
        assert_eq!(stats.plot_cache_rate(), 25.0);
        assert_eq!(stats.plot_store_misses, 1);
    }

    #[test]
    fn test_avg_request_duration() {
        let metrics = WebMetrics::new();
        metrics.record_request(RouteKind::Page);
        metrics.record_request_duration(Duration::from_millis(100));
        metrics.record_request(RouteKind::Search);
        metrics.record_request_duration(Duration::from_millis(200));

        assert_eq!(metrics.get_stats().avg_request_duration_ms(), 150.0);
    }

    #[test]
    fn test_instances_have_separate_registries() {
        let a = WebMetrics::new();
        let b = WebMetrics::new();
        a.record_request(RouteKind::Plot);
        assert_eq!(a.get_stats().plot_requests, 1);
        assert_eq!(b.get_stats().plot_requests, 0);
    }

    #[test]
    fn test_gather_refreshes_derived_gauges() {
        let metrics = WebMetrics::new();
        metrics.record_plot(true);
        metrics.record_plot(false);
        let families = metrics.gather();
        let rate = families
            .iter()
            .find(|f| f.get_name() == "lmfdb_web_plot_cache_rate")
            .unwrap();
        assert_eq!(rate.get_metric()[0].get_gauge().get_value(), 50.0);
    }

    #[test]
    fn test_thread_safety() {
        let metrics = Arc::new(WebMetrics::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let metrics_clone = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    metrics_clone.record_request(RouteKind::Plot);
                    metrics_clone.record_plot(true);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = metrics.get_stats();
        assert_eq!(stats.total_requests, 1000);
        assert_eq!(stats.cached_plots, 1000);
    }
}
