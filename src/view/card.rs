use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use utoipa::ToSchema;

use super::{Localization, SensorView};
use crate::error::{AppError, AppResult};
use crate::readings::display::render;
use crate::readings::{ProjectedPoint, Reading, ReadingKind};

/// Padding added above and below the data range on the y-axis.
const Y_PADDING: f64 = 5.0;

/// Y-axis range used when a dataset has no points.
const EMPTY_Y_BOUNDS: (f64, f64) = (0.0, 10.0);

/// One chart's points and the y-axis range derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartDataset {
    pub points: Vec<ProjectedPoint>,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartDataset {
    fn new(points: Vec<ProjectedPoint>) -> Self {
        let (y_min, y_max) = y_bounds(&points);
        Self {
            points,
            y_min,
            y_max,
        }
    }

    fn extend(&mut self, points: Vec<ProjectedPoint>) {
        self.points.extend(points);
        (self.y_min, self.y_max) = y_bounds(&self.points);
    }
}

impl Default for ChartDataset {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn y_bounds(points: &[ProjectedPoint]) -> (f64, f64) {
    if points.is_empty() {
        return EMPTY_Y_BOUNDS;
    }
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
            (min.min(p.y), max.max(p.y))
        });
    (min - Y_PADDING, max + Y_PADDING)
}

/// Display state of one sensor card.
///
/// `revision` increases on every write that changes something, so readers can
/// tell whether they are looking at stale data.
#[derive(Debug, Clone)]
pub struct SensorCard {
    name: String,
    online: bool,
    kinds: Vec<ReadingKind>,
    readings: BTreeMap<ReadingKind, Reading>,
    charts: BTreeMap<ReadingKind, ChartDataset>,
    revision: u64,
}

impl SensorCard {
    /// A card showing `kinds`, offline and unnamed until the first writes arrive.
    #[must_use]
    pub fn new(kinds: &[ReadingKind]) -> Self {
        Self {
            name: String::new(),
            online: false,
            kinds: kinds.to_vec(),
            readings: BTreeMap::new(),
            charts: kinds.iter().map(|k| (*k, ChartDataset::default())).collect(),
            revision: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.online
    }

    #[must_use]
    pub fn kinds(&self) -> &[ReadingKind] {
        &self.kinds
    }

    #[must_use]
    pub fn reading(&self, kind: ReadingKind) -> Option<&Reading> {
        self.readings.get(&kind)
    }

    #[must_use]
    pub fn chart(&self, kind: ReadingKind) -> Option<&ChartDataset> {
        self.charts.get(&kind)
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn snapshot(&self, localization: &dyn Localization) -> CardSnapshot {
        CardSnapshot {
            name: self.name.clone(),
            online: self.online,
            revision: self.revision,
            readings: self
                .kinds
                .iter()
                .filter_map(|kind| self.readings.get(kind))
                .map(|reading| ReadingSnapshot {
                    kind: reading.kind,
                    label: localization.label(reading.kind).to_string(),
                    display: render(reading),
                    reading: *reading,
                })
                .collect(),
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

impl SensorView for SensorCard {
    fn set_online(&mut self, online: bool) {
        if self.online != online {
            self.online = online;
            self.touch();
        }
    }

    fn set_name(&mut self, name: &str) {
        if self.name != name {
            name.clone_into(&mut self.name);
            self.touch();
        }
    }

    fn set_current_reading(&mut self, kind: ReadingKind, reading: Reading) -> AppResult<()> {
        if reading.kind != kind {
            return Err(AppError::KindMismatch {
                expected: kind,
                actual: reading.kind,
            });
        }
        if self.readings.get(&kind) != Some(&reading) {
            self.readings.insert(kind, reading);
            self.touch();
        }
        Ok(())
    }

    fn set_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>) {
        let dataset = ChartDataset::new(points);
        if self.charts.get(&kind) != Some(&dataset) {
            self.charts.insert(kind, dataset);
            self.touch();
        }
    }

    fn append_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>) {
        if points.is_empty() {
            return;
        }
        self.charts.entry(kind).or_default().extend(points);
        self.touch();
    }
}

/// Serializable view of the card for the JSON API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CardSnapshot {
    pub name: String,
    pub online: bool,
    pub revision: u64,
    pub readings: Vec<ReadingSnapshot>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadingSnapshot {
    pub kind: ReadingKind,
    /// Localized kind name
    pub label: String,
    /// Formatted value, e.g. `21.5C`
    pub display: String,
    pub reading: Reading,
}

/// Shared handle to a card: the update cycle writes through it, HTTP handlers read.
#[derive(Debug, Clone)]
pub struct CardHandle {
    inner: Arc<RwLock<SensorCard>>,
}

impl CardHandle {
    #[must_use]
    pub fn new(card: SensorCard) -> Self {
        Self {
            inner: Arc::new(RwLock::new(card)),
        }
    }

    /// Read access. A writer that panicked cannot leave the card half-updated
    /// (every setter is a single assignment), so poisoning is ignored.
    pub fn read(&self) -> RwLockReadGuard<'_, SensorCard> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SensorCard> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SensorView for CardHandle {
    fn set_online(&mut self, online: bool) {
        self.write().set_online(online);
    }

    fn set_name(&mut self, name: &str) {
        self.write().set_name(name);
    }

    fn set_current_reading(&mut self, kind: ReadingKind, reading: Reading) -> AppResult<()> {
        self.write().set_current_reading(kind, reading)
    }

    fn set_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>) {
        self.write().set_chart_data(kind, points);
    }

    fn append_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>) {
        self.write().append_chart_data(kind, points);
    }
}
