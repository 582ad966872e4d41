//! Plots of Hardy Z functions
//!
//! Two paths produce the samples of a plot:
//!
//! - **Cached**: a precomputed row in the plot store for the object's
//!   domain. Any problem with the store (missing file, missing row, bad
//!   data) is a [`LmfdbError::PlotStoreMiss`] and the direct path is used.
//! - **Direct**: stored plot points of the L-function, or its Hardy Z
//!   function evaluated on a coarse grid.
//!
//! Either way the samples are interpolated with a cubic spline, resampled
//! on a fine grid and rasterised to PNG through a temporary file.

use crate::error::{LmfdbError, Result};
use crate::lfunction::Descriptor;
use crate::metrics::WebMetrics;
use crate::spline::{frange, CubicSpline};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Plot width in pixels
const WIDTH: u32 = 600;
/// Plot height in pixels
const HEIGHT: u32 = 400;

/// Range plotted from the plot store
const CACHED_RANGE: f64 = 30.0;
/// Step used to evaluate Z on the direct path
const COARSE_STEP: f64 = 0.1;
/// Step of the rendered curve
const FINE_STEP: f64 = 0.05;

/// One precomputed plot in a plot store file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRow {
    /// Selection condition, e.g. `label = '11.a'`
    pub condition: String,
    pub start: f64,
    pub end: f64,
    /// Little-endian `f64` values at equally spaced abscissas
    pub points: Vec<u8>,
}

impl PlotRow {
    pub fn from_values(condition: impl Into<String>, start: f64, end: f64, values: &[f64]) -> Self {
        PlotRow {
            condition: condition.into(),
            start,
            end,
            points: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }
}

/// Sampled `(t, Z(t))` pairs
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSamples {
    pub points: Vec<(f64, f64)>,
}

impl PlotSamples {
    /// Decode a stored row: `n` values spread over `[start, end)`
    pub fn from_row(row: &PlotRow) -> Result<Self> {
        if row.points.is_empty() || row.points.len() % 8 != 0 {
            return Err(LmfdbError::PlotStoreMiss(format!(
                "row '{}' has {} bytes of points",
                row.condition,
                row.points.len()
            )));
        }
        let values: Vec<f64> = row
            .points
            .chunks_exact(8)
            .map(|chunk| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(chunk);
                f64::from_le_bytes(bytes)
            })
            .collect();
        let step = (row.end - row.start) / values.len() as f64;
        Ok(PlotSamples {
            points: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (row.start + i as f64 * step, v))
                .collect(),
        })
    }

    /// Spline through the samples, evaluated every `step` over `[-range, range)`
    pub fn resample(&self, range: f64, step: f64) -> Result<Vec<(f64, f64)>> {
        let spline = CubicSpline::new(&self.points)?;
        Ok(spline.sample(-range, range, step))
    }
}

/// Directory of precomputed plots, one bincode file per domain
#[derive(Debug, Clone)]
pub struct PlotStore {
    dir: PathBuf,
}

impl PlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        PlotStore { dir: dir.into() }
    }

    fn domain_path(&self, domain: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", domain))
    }

    /// Samples stored for `condition` in `domain`
    pub fn lookup(&self, domain: &str, condition: &str) -> Result<PlotSamples> {
        let path = self.domain_path(domain);
        if !path.exists() {
            return Err(LmfdbError::PlotStoreMiss(format!(
                "no plot store at {}",
                path.display()
            )));
        }
        let bytes = fs::read(&path)
            .map_err(|e| LmfdbError::PlotStoreMiss(format!("{}: {}", path.display(), e)))?;
        let rows: Vec<PlotRow> = bincode::deserialize(&bytes)
            .map_err(|e| LmfdbError::PlotStoreMiss(format!("{}: {}", path.display(), e)))?;
        let row = rows
            .iter()
            .find(|row| row.condition == condition)
            .ok_or_else(|| {
                LmfdbError::PlotStoreMiss(format!("no row where {} in {}", condition, domain))
            })?;
        PlotSamples::from_row(row)
    }

    /// Write a domain file, replacing any existing one
    pub fn write(&self, domain: &str, rows: &[PlotRow]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let bytes = bincode::serialize(rows)
            .map_err(|e| LmfdbError::PlotError(format!("encoding plot store: {}", e)))?;
        fs::write(self.domain_path(domain), bytes)?;
        Ok(())
    }
}

/// Look of a rendered plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotStyle {
    /// Stroke width of the curve in pixels
    pub thickness: u32,
    /// Nominal label font size; sizes the axis ticks
    pub font_size: u32,
}

impl PlotStyle {
    pub const CACHED: PlotStyle = PlotStyle {
        thickness: 1,
        font_size: 8,
    };
    pub const DIRECT: PlotStyle = PlotStyle {
        thickness: 2,
        font_size: 10,
    };
}

/// Half-width of the plotted range for the direct path
pub fn direct_range(desc: &Descriptor) -> f64 {
    if desc.plot_points.is_some() || desc.ltype.has_wide_range() {
        30.0
    } else {
        12.0
    }
}

/// Coarse samples for the direct path, `None` when nothing can be plotted
pub fn direct_samples(desc: &Descriptor) -> Option<PlotSamples> {
    if let Some(points) = &desc.plot_points {
        return Some(PlotSamples {
            points: points.clone(),
        });
    }
    let numeric = desc.numeric.as_deref()?;
    let range = direct_range(desc);
    Some(PlotSamples {
        points: frange(-range, range, COARSE_STEP)
            .map(|t| (t, numeric.z(t)))
            .collect(),
    })
}

fn draw_err<E: std::fmt::Display>(e: E) -> LmfdbError {
    LmfdbError::PlotError(e.to_string())
}

fn tick_spacing(range: f64) -> f64 {
    match range {
        r if r > 20.0 => 5.0,
        r if r > 5.0 => 2.0,
        _ => 1.0,
    }
}

fn draw_png(path: &Path, points: &[(f64, f64)], style: PlotStyle) -> Result<()> {
    let x0 = points.first().map_or(-1.0, |p| p.0);
    let x1 = points.last().map_or(1.0, |p| p.0).max(x0 + 1e-6);
    let (mut y0, mut y1) = points
        .iter()
        .fold((0.0f64, 0.0f64), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    if y1 - y0 < 1e-9 {
        y0 -= 1.0;
        y1 += 1.0;
    }
    let pad = 0.05 * (y1 - y0);
    let (y0, y1) = (y0 - pad, y1 + pad);

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(draw_err)?;

    let gray = RGBColor(128, 128, 128);
    let axis = gray.stroke_width(1);
    chart
        .draw_series(LineSeries::new(vec![(x0, 0.0), (x1, 0.0)], axis))
        .map_err(draw_err)?;
    if x0 <= 0.0 && x1 >= 0.0 {
        chart
            .draw_series(LineSeries::new(vec![(0.0, y0), (0.0, y1)], axis))
            .map_err(draw_err)?;
    }

    let tick = (y1 - y0) * style.font_size as f64 / (2.0 * HEIGHT as f64);
    let spacing = tick_spacing(x1 - x0);
    let ticks = frange((x0 / spacing).ceil() * spacing, x1, spacing)
        .map(|x| PathElement::new(vec![(x, -tick), (x, tick)], axis));
    chart.draw_series(ticks).map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            BLUE.stroke_width(style.thickness),
        ))
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Rasterise a curve to PNG bytes
///
/// The image goes through a uniquely named temporary file that is removed
/// once read back.
pub fn render_png(points: &[(f64, f64)], style: PlotStyle) -> Result<Vec<u8>> {
    let file = tempfile::Builder::new()
        .prefix("lfunction_plot_")
        .suffix(".png")
        .tempfile()?;
    draw_png(file.path(), points, style)?;
    let data = fs::read(file.path())?;
    file.close()?;
    debug!("rendered plot of {} points ({} bytes)", points.len(), data.len());
    Ok(data)
}

/// Renders L-function plots, preferring the plot store
pub struct PlotRenderer {
    store: PlotStore,
    metrics: Arc<WebMetrics>,
}

impl PlotRenderer {
    pub fn new(store: PlotStore, metrics: Arc<WebMetrics>) -> Self {
        PlotRenderer { store, metrics }
    }

    /// Plot from the plot store row `(domain, condition)`
    pub fn render_cached(&self, domain: &str, condition: &str) -> Result<Vec<u8>> {
        let samples = self.store.lookup(domain, condition)?;
        let curve = samples
            .resample(CACHED_RANGE, FINE_STEP)
            .map_err(|e| LmfdbError::PlotStoreMiss(e.to_string()))?;
        render_png(&curve, PlotStyle::CACHED)
    }

    /// Plot computed from the descriptor
    ///
    /// `None` when it has no Z function, or too few finite samples to draw.
    pub fn render_direct(&self, desc: &Descriptor) -> Result<Option<Vec<u8>>> {
        let Some(samples) = direct_samples(desc) else {
            return Ok(None);
        };
        let curve = match samples.resample(direct_range(desc), FINE_STEP) {
            Ok(curve) => curve,
            Err(e) => {
                warn!("no direct plot for {}: {}", desc.url_path, e);
                return Ok(None);
            }
        };
        render_png(&curve, PlotStyle::DIRECT).map(Some)
    }

    /// PNG plot of an L-function
    ///
    /// # Arguments
    /// * `cached` - Plot store `(domain, condition)` to try first, if any
    /// * `desc` - The L-function, used for the direct path
    ///
    /// # Returns
    /// * `Ok(Some(png))` on success
    /// * `Ok(None)` if no plot can be produced
    pub fn render(&self, cached: Option<(&str, &str)>, desc: &Descriptor) -> Result<Option<Vec<u8>>> {
        if let Some((domain, condition)) = cached {
            match self.render_cached(domain, condition) {
                Ok(png) => {
                    self.metrics.record_plot(true);
                    return Ok(Some(png));
                }
                Err(e) if e.falls_back_to_direct_plot() => {
                    warn!("falling back to direct plot: {}", e);
                    self.metrics.record_plot_store_miss();
                }
                Err(e) => return Err(e),
            }
        }
        let png = self.render_direct(desc)?;
        if png.is_some() {
            self.metrics.record_plot(false);
        }
        Ok(png)
    }
}
