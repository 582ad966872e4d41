//! Plot rendering: plot store first, direct evaluation as the fallback

use lmfdb_web::lfunction::builder::riemann_descriptor;
use lmfdb_web::plot::{PlotRenderer, PlotRow, PlotStore};
use lmfdb_web::WebMetrics;
use std::sync::Arc;
use tempfile::TempDir;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn renderer(dir: &std::path::Path) -> (PlotRenderer, Arc<WebMetrics>) {
    let metrics = Arc::new(WebMetrics::new());
    (PlotRenderer::new(PlotStore::new(dir), Arc::clone(&metrics)), metrics)
}

#[test]
fn test_missing_store_falls_through_to_direct() {
    let dir = TempDir::new().unwrap();
    let (renderer, metrics) = renderer(&dir.path().join("absent"));

    let png = renderer
        .render(Some(("ecplots", "label = '11.a'")), &riemann_descriptor())
        .unwrap()
        .expect("direct plot");
    assert_eq!(&png[..8], &PNG_MAGIC);

    let stats = metrics.get_stats();
    assert_eq!(stats.plot_store_misses, 1);
    assert_eq!(stats.direct_plots, 1);
    assert_eq!(stats.cached_plots, 0);
}

#[test]
fn test_malformed_store_falls_through_to_direct() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ecplots.bin"), b"not bincode").unwrap();
    let (renderer, metrics) = renderer(dir.path());

    let png = renderer
        .render(Some(("ecplots", "label = '11.a'")), &riemann_descriptor())
        .unwrap();
    assert!(png.is_some());
    assert_eq!(metrics.get_stats().plot_store_misses, 1);
}

#[test]
fn test_missing_row_falls_through_to_direct() {
    let dir = TempDir::new().unwrap();
    let store = PlotStore::new(dir.path());
    let values: Vec<f64> = (0..600).map(|i| ((i as f64) * 0.1).sin()).collect();
    store
        .write("ecplots", &[PlotRow::from_values("label = '37.a'", -30.0, 30.0, &values)])
        .unwrap();
    let (renderer, metrics) = renderer(dir.path());

    assert!(renderer
        .render(Some(("ecplots", "label = '11.a'")), &riemann_descriptor())
        .unwrap()
        .is_some());
    assert_eq!(metrics.get_stats().direct_plots, 1);
}

#[test]
fn test_stored_row_is_used() {
    let dir = TempDir::new().unwrap();
    let store = PlotStore::new(dir.path());
    let values: Vec<f64> = (0..600).map(|i| ((i as f64) * 0.1).sin()).collect();
    store
        .write("ecplots", &[PlotRow::from_values("label = '11.a'", -30.0, 30.0, &values)])
        .unwrap();
    let (renderer, metrics) = renderer(dir.path());

    let mut desc = riemann_descriptor();
    desc.numeric = None;
    let png = renderer
        .render(Some(("ecplots", "label = '11.a'")), &desc)
        .unwrap()
        .expect("cached plot");
    assert_eq!(&png[..8], &PNG_MAGIC);

    let stats = metrics.get_stats();
    assert_eq!(stats.cached_plots, 1);
    assert_eq!(stats.plot_store_misses, 0);
}

#[test]
fn test_no_plot_without_z_function() {
    let dir = TempDir::new().unwrap();
    let (renderer, metrics) = renderer(dir.path());
    let mut desc = riemann_descriptor();
    desc.numeric = None;
    desc.plot_points = None;

    assert_eq!(renderer.render(None, &desc).unwrap(), None);
    assert_eq!(metrics.get_stats().direct_plots, 0);
}

#[test]
fn test_single_stored_point_is_no_plot() {
    let dir = TempDir::new().unwrap();
    let (renderer, metrics) = renderer(dir.path());
    let mut desc = riemann_descriptor();
    desc.numeric = None;
    desc.plot_points = Some(vec![(0.0, 1.0)]);

    // falls through the missing store, then has nothing to draw
    assert_eq!(
        renderer.render(Some(("ecplots", "label = '11.a'")), &desc).unwrap(),
        None
    );
    let stats = metrics.get_stats();
    assert_eq!(stats.plot_store_misses, 1);
    assert_eq!(stats.direct_plots, 0);
}

#[test]
fn test_stored_plot_points_are_used_directly() {
    let dir = TempDir::new().unwrap();
    let (renderer, _) = renderer(dir.path());
    let mut desc = riemann_descriptor();
    desc.numeric = None;
    desc.plot_points = Some((0..100).map(|i| (i as f64 * 0.6 - 30.0, (i as f64).cos())).collect());

    assert!(renderer.render(None, &desc).unwrap().is_some());
}
