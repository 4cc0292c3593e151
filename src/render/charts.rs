/// Chart configurations and chart lifetime management.
///
/// The crate never draws charts itself. It produces [`ChartConfig`] series
/// data and hands them to a [`ChartSurface`], the external charting
/// collaborator. [`ChartRegistry`] owns the live handle of each slot and
/// destroys it before creating a replacement, so repeated renders never
/// accumulate chart instances.
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::analytics::products::ProductAnalysis;
use crate::analytics::reporter::{CompanyMetric, PriorityDistribution};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const TOTAL_FILL: &str = "rgba(15, 98, 254, 0.6)";
const TOTAL_BORDER: &str = "#0f62fe";
const HIGH_FILL: &str = "rgba(245, 158, 11, 0.6)";
const HIGH_BORDER: &str = "#f59e0b";

const PRIORITY_FILLS: [&str; 3] = [
    "rgba(245, 158, 11, 0.8)",
    "rgba(59, 130, 246, 0.8)",
    "rgba(16, 185, 129, 0.8)",
];
const PRIORITY_BORDERS: [&str; 3] = ["#f59e0b", "#3b82f6", "#10b981"];

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<usize>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u8,
}

impl Dataset {
    fn uniform(label: &str, data: Vec<usize>, fill: &str, border: &str) -> Self {
        Self {
            label: label.to_string(),
            data,
            background_color: vec![fill.to_string()],
            border_color: vec![border.to_string()],
            border_width: 2,
        }
    }
}

/// Series data for one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: Option<String>,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartConfig {
    /// Every dataset must carry one value per label.
    pub fn validate(&self, slot: ChartSlot) -> Result<(), RenderError> {
        for dataset in &self.datasets {
            if dataset.data.len() != self.labels.len() {
                return Err(RenderError::Chart {
                    slot: slot.to_string(),
                    reason: format!(
                        "dataset '{}' has {} values for {} labels",
                        dataset.label,
                        dataset.data.len(),
                        self.labels.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Grouped bar chart: total vs. high-priority tickets per company.
pub fn company_chart(metrics: &[CompanyMetric]) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Bar,
        title: None,
        labels: metrics.iter().map(|m| m.company.clone()).collect(),
        datasets: vec![
            Dataset::uniform(
                "Total Tickets",
                metrics.iter().map(|m| m.counts.total).collect(),
                TOTAL_FILL,
                TOTAL_BORDER,
            ),
            Dataset::uniform(
                "High Priority",
                metrics.iter().map(|m| m.counts.high).collect(),
                HIGH_FILL,
                HIGH_BORDER,
            ),
        ],
    }
}

/// Donut chart of the priority distribution.
pub fn priority_chart(dist: &PriorityDistribution) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Doughnut,
        title: None,
        labels: vec!["High".into(), "Medium".into(), "Low".into()],
        datasets: vec![Dataset {
            label: "Tickets".to_string(),
            data: vec![dist.high, dist.medium, dist.low],
            background_color: PRIORITY_FILLS.iter().map(|s| s.to_string()).collect(),
            border_color: PRIORITY_BORDERS.iter().map(|s| s.to_string()).collect(),
            border_width: 2,
        }],
    }
}

/// Bar chart of one company's product categories.
pub fn product_chart(analysis: &ProductAnalysis) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Bar,
        title: Some(format!("Product Analysis for {}", analysis.company)),
        labels: analysis
            .categories
            .iter()
            .map(|c| c.category.clone())
            .collect(),
        datasets: vec![
            Dataset::uniform(
                "Total Tickets",
                analysis.categories.iter().map(|c| c.counts.total).collect(),
                TOTAL_FILL,
                TOTAL_BORDER,
            ),
            Dataset::uniform(
                "High Priority",
                analysis.categories.iter().map(|c| c.counts.high).collect(),
                HIGH_FILL,
                HIGH_BORDER,
            ),
        ],
    }
}

// ---------------------------------------------------------------------------
// Chart surface
// ---------------------------------------------------------------------------

/// Where a chart is drawn on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSlot {
    Company,
    Priority,
    Product,
}

impl std::fmt::Display for ChartSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Company => write!(f, "company"),
            Self::Priority => write!(f, "priority"),
            Self::Product => write!(f, "product"),
        }
    }
}

/// Handle to a live chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartHandle {
    pub slot: ChartSlot,
    pub id: u64,
}

/// The charting collaborator.
pub trait ChartSurface {
    fn create(&mut self, slot: ChartSlot, config: &ChartConfig) -> Result<ChartHandle, RenderError>;
    fn destroy(&mut self, handle: ChartHandle);
}

/// Surface for views shipped to another renderer (the browser page or the
/// terminal). Hands out sequential ids; the consumer destroys the chart with
/// the previous id of a slot when a new id arrives.
#[derive(Debug, Default)]
pub struct ViewSurface {
    next_id: u64,
    live: usize,
}

impl ViewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of charts created and not yet destroyed.
    pub fn live_charts(&self) -> usize {
        self.live
    }
}

impl ChartSurface for ViewSurface {
    fn create(&mut self, slot: ChartSlot, _config: &ChartConfig) -> Result<ChartHandle, RenderError> {
        self.next_id += 1;
        self.live += 1;
        Ok(ChartHandle {
            slot,
            id: self.next_id,
        })
    }

    fn destroy(&mut self, _handle: ChartHandle) {
        self.live = self.live.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Owns the live chart of every slot.
#[derive(Debug)]
pub struct ChartRegistry<S> {
    surface: S,
    live: HashMap<ChartSlot, ChartHandle>,
}

impl<S: ChartSurface> ChartRegistry<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            live: HashMap::new(),
        }
    }

    /// Destroy the current chart of `slot`, if any, then create a new one.
    pub fn replace(&mut self, slot: ChartSlot, config: &ChartConfig) -> Result<ChartHandle, RenderError> {
        config.validate(slot)?;
        self.clear(slot);
        let handle = self.surface.create(slot, config)?;
        debug!(%slot, id = handle.id, "chart created");
        self.live.insert(slot, handle);
        Ok(handle)
    }

    /// Destroy the current chart of `slot`, leaving it empty.
    pub fn clear(&mut self, slot: ChartSlot) {
        if let Some(old) = self.live.remove(&slot) {
            debug!(%slot, id = old.id, "chart destroyed");
            self.surface.destroy(old);
        }
    }

    /// Destroy every live chart.
    pub fn clear_all(&mut self) {
        for (slot, old) in self.live.drain() {
            debug!(%slot, id = old.id, "chart destroyed");
            self.surface.destroy(old);
        }
    }

    pub fn handle(&self, slot: ChartSlot) -> Option<ChartHandle> {
        self.live.get(&slot).copied()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
