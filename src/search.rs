//! Search argument parsing into typed document filters
//!
//! Request arguments arrive as strings. Each `parse_*` helper reads one
//! argument, validates it and adds a [`Condition`] on a document field to the
//! [`Query`]. Invalid input is reported as [`LmfdbError::SearchInput`].

use crate::error::{LmfdbError, Result};
use crate::models::validate_label;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Raw request arguments (query string)
pub type Args = BTreeMap<String, String>;

/// Condition on a single document field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum Condition {
    /// Field equals the value exactly
    Eq(Value),
    /// Integer field within the inclusive bounds
    Range { min: Option<i64>, max: Option<i64> },
    /// Any of the nested conditions holds
    AnyOf(Vec<Condition>),
    /// Array field has exactly this many elements
    Size(usize),
    /// Array field contains every listed element
    ContainsAll(Vec<Value>),
    /// String field starts with the given text
    Prefix(String),
}

impl Condition {
    /// Check the condition against a field value (`None` if the field is absent)
    pub fn matches(&self, field: Option<&Value>) -> bool {
        match self {
            Condition::Eq(expected) => field == Some(expected),
            Condition::Range { min, max } => match field.and_then(Value::as_i64) {
                Some(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
                None => false,
            },
            Condition::AnyOf(options) => options.iter().any(|c| c.matches(field)),
            Condition::Size(n) => field
                .and_then(Value::as_array)
                .map_or(false, |arr| arr.len() == *n),
            Condition::ContainsAll(items) => match field.and_then(Value::as_array) {
                Some(arr) => items.iter().all(|item| arr.contains(item)),
                None => false,
            },
            Condition::Prefix(prefix) => field
                .and_then(Value::as_str)
                .map_or(false, |s| s.starts_with(prefix.as_str())),
        }
    }
}

/// A filter mapping from (dotted) field paths to conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query {
    conditions: BTreeMap<String, Condition>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, condition: Condition) {
        self.conditions.insert(field.into(), condition);
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Whether a document satisfies every condition
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(path, cond)| cond.matches(lookup_path(doc, path)))
    }

    /// Serialize for round-tripping through a download link
    pub fn to_stored(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a filter previously produced by [`Query::to_stored`]
    pub fn from_stored(stored: &str) -> Result<Self> {
        serde_json::from_str(stored)
            .map_err(|e| LmfdbError::SearchInput(format!("invalid stored query: {}", e)))
    }
}

/// Resolve a dotted path such as `polynomial.2` inside a document
pub fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn arg<'a>(info: &'a Args, field: &str) -> Option<&'a str> {
    info.get(field)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn strip_brackets(s: &str) -> &str {
    s.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
}

fn parse_int(field: &str, s: &str) -> Result<i64> {
    s.trim().parse::<i64>().map_err(|_| {
        LmfdbError::SearchInput(format!("{} must be an integer, range or list, got '{}'", field, s))
    })
}

fn parse_bound(field: &str, s: &str) -> Result<Option<i64>> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_int(field, s).map(Some)
    }
}

fn parse_int_item(field: &str, item: &str) -> Result<Condition> {
    let item = item.trim();
    if let Some((lo, hi)) = item.split_once("..") {
        return Ok(Condition::Range {
            min: parse_bound(field, lo)?,
            max: parse_bound(field, hi)?,
        });
    }
    // A dash after the first character separates a range; a leading one is a sign
    if let Some(pos) = item.get(1..).and_then(|rest| rest.find('-')) {
        let (lo, hi) = item.split_at(pos + 1);
        return Ok(Condition::Range {
            min: parse_bound(field, lo)?,
            max: parse_bound(field, &hi[1..])?,
        });
    }
    Ok(Condition::Eq(Value::from(parse_int(field, item)?)))
}

/// Parse an integer argument: `5`, `2-7`, `3..`, `..8` or a comma list of those
pub fn parse_ints(info: &Args, query: &mut Query, field: &str) -> Result<()> {
    parse_ints_into(info, query, field, field)
}

/// Like [`parse_ints`] but storing the condition under `qfield`
pub fn parse_ints_into(info: &Args, query: &mut Query, field: &str, qfield: &str) -> Result<()> {
    let Some(raw) = arg(info, field) else {
        return Ok(());
    };
    let mut items = raw
        .split(',')
        .map(|item| parse_int_item(field, item))
        .collect::<Result<Vec<_>>>()?;
    let condition = if items.len() == 1 {
        items.remove(0)
    } else {
        Condition::AnyOf(items)
    };
    debug!("search filter {} -> {:?}", qfield, condition);
    query.insert(qfield, condition);
    Ok(())
}

/// Reduce `n/d` and render it the way slopes are stored (`0`, `1`, `1/2`)
fn normalize_slope(field: &str, s: &str) -> Result<String> {
    let bad = || LmfdbError::SearchInput(format!("{}: '{}' is not a slope between 0 and 1", field, s));
    let (n, d) = match s.trim().split_once('/') {
        Some((n, d)) => (
            n.trim().parse::<i64>().map_err(|_| bad())?,
            d.trim().parse::<i64>().map_err(|_| bad())?,
        ),
        None => (s.trim().parse::<i64>().map_err(|_| bad())?, 1),
    };
    if d <= 0 || n < 0 || n > d {
        return Err(bad());
    }
    let g = gcd(n, d).max(1);
    let (n, d) = (n / g, d / g);
    Ok(if d == 1 { n.to_string() } else { format!("{}/{}", n, d) })
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

fn slope_value(s: &str) -> f64 {
    match s.split_once('/') {
        Some((n, d)) => n.parse::<f64>().unwrap_or(0.0) / d.parse::<f64>().unwrap_or(1.0),
        None => s.parse().unwrap_or(0.0),
    }
}

/// Parse Newton polygon slopes, e.g. `[0,1/2,1]`
///
/// Slopes must lie in `[0, 1]` and be non-decreasing. A class matches when
/// every listed slope occurs among its slopes.
pub fn parse_newton_polygon(info: &Args, query: &mut Query, field: &str, qfield: &str) -> Result<()> {
    let Some(raw) = arg(info, field) else {
        return Ok(());
    };
    let slopes = strip_brackets(raw)
        .split(',')
        .map(|s| normalize_slope(field, s))
        .collect::<Result<Vec<_>>>()?;
    if slopes
        .windows(2)
        .any(|w| slope_value(&w[0]) > slope_value(&w[1]))
    {
        return Err(LmfdbError::SearchInput(format!(
            "{}: slopes must be listed in increasing order",
            field
        )));
    }
    query.insert(
        qfield,
        Condition::ContainsAll(slopes.into_iter().map(Value::from).collect()),
    );
    Ok(())
}

/// Parse a list of leading integers, e.g. `1,-2,3`
///
/// Entry `i` constrains `qfield.(i + index_shift)`.
pub fn parse_list_start(
    info: &Args,
    query: &mut Query,
    field: &str,
    qfield: &str,
    index_shift: usize,
) -> Result<()> {
    let Some(raw) = arg(info, field) else {
        return Ok(());
    };
    for (i, item) in strip_brackets(raw).split(',').enumerate() {
        let value = parse_int(field, item)?;
        query.insert(
            format!("{}.{}", qfield, i + index_shift),
            Condition::Eq(Value::from(value)),
        );
    }
    Ok(())
}

/// Parse a decomposition, e.g. `[[1.2.ab,2],[1.2.b,1]]`
///
/// A class matches when every listed `(label, multiplicity)` factor occurs
/// in its decomposition.
pub fn parse_abvar_decomp(info: &Args, query: &mut Query, field: &str) -> Result<()> {
    let Some(raw) = arg(info, field) else {
        return Ok(());
    };
    let inner = raw.trim();
    let inner = inner
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(inner);

    let mut factors = Vec::new();
    for chunk in inner.split(']') {
        let chunk = chunk.trim().trim_start_matches(',').trim().trim_start_matches('[');
        if chunk.is_empty() {
            continue;
        }
        let (label, mult) = chunk.split_once(',').ok_or_else(|| {
            LmfdbError::SearchInput(format!("{}: factor '{}' needs a multiplicity", field, chunk))
        })?;
        let label = label.trim().trim_matches(|c| c == '"' || c == '\'');
        validate_label(label).map_err(|e| LmfdbError::SearchInput(e.to_string()))?;
        let mult: u32 = mult.trim().parse().map_err(|_| {
            LmfdbError::SearchInput(format!("{}: '{}' is not a multiplicity", field, mult.trim()))
        })?;
        if mult == 0 {
            return Err(LmfdbError::SearchInput(format!(
                "{}: multiplicities must be positive",
                field
            )));
        }
        factors.push(serde_json::json!([label, mult]));
    }
    if factors.is_empty() {
        return Err(LmfdbError::SearchInput(format!("{}: no factors given", field)));
    }
    query.insert(field, Condition::ContainsAll(factors));
    Ok(())
}

/// Results per page: `count` argument or the default, capped at `max`
pub fn parse_count(info: &Args, default: usize, max: usize) -> usize {
    match arg(info, "count").and_then(|s| s.parse::<usize>().ok()) {
        Some(0) | None => default,
        Some(n) => n.min(max),
    }
}

/// First result to show: `start` argument or 0
pub fn parse_start(info: &Args) -> usize {
    arg(info, "start")
        .and_then(|s| s.parse::<i64>().ok())
        .map_or(0, |s| s.max(0) as usize)
}

/// Build the query for an abelian-variety search
pub fn abvar_query(info: &Args) -> Result<Query> {
    let mut query = Query::new();
    parse_ints(info, &mut query, "q")?;
    parse_ints(info, &mut query, "g")?;
    if arg(info, "simple_only") == Some("yes") {
        query.insert("decomposition", Condition::Size(1));
    }
    if arg(info, "primitive_only") == Some("yes") {
        query.insert("primitive_models", Condition::Eq(Value::Array(Vec::new())));
    }
    parse_ints(info, &mut query, "p_rank")?;
    parse_newton_polygon(info, &mut query, "newton_polygon", "slopes")?;
    parse_list_start(info, &mut query, "initial_coefficients", "polynomial", 1)?;
    parse_list_start(info, &mut query, "abvar_point_count", "A_counts", 0)?;
    parse_list_start(info, &mut query, "curve_point_count", "C_counts", 0)?;
    parse_abvar_decomp(info, &mut query, "decomposition")?;
    Ok(query)
}

/// A page of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub start: usize,
    pub count: usize,
    pub number: usize,
}

impl Pagination {
    /// Pull an out-of-range `start` back by whole pages
    pub fn new(start: usize, count: usize, number: usize) -> Self {
        let count = count.max(1);
        let mut start = start as i64;
        let nres = number as i64;
        let c = count as i64;
        if start >= nres {
            start -= (1 + (start - nres) / c) * c;
        }
        Pagination {
            start: start.max(0) as usize,
            count,
            number,
        }
    }

    pub fn more(&self) -> bool {
        self.start + self.count < self.number
    }

    pub fn report(&self) -> String {
        if self.number == 1 {
            "unique_match".to_string()
        } else if self.number > self.count || self.start != 0 {
            format!(
                "displaying matches {}-{} of {}",
                self.start + 1,
                self.number.min(self.start + self.count),
                self.number
            )
        } else {
            format!("displaying all {} matches", self.number)
        }
    }
}
