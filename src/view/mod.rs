//! The card the update cycle writes to, and what the HTTP layer reads back.

pub mod card;
pub mod html;
pub mod localization;

pub use card::{CardHandle, CardSnapshot, ChartDataset, SensorCard};
pub use localization::{EnglishLocalization, Localization};

use crate::error::AppResult;
use crate::readings::{ProjectedPoint, Reading, ReadingKind};

/// Setters the update cycle drives. All are fire-and-forget except
/// [`SensorView::set_current_reading`], which guards kind consistency.
///
/// Implementations are expected to ignore writes that would not change what
/// is displayed.
pub trait SensorView: Send {
    fn set_online(&mut self, online: bool);

    fn set_name(&mut self, name: &str);

    /// # Errors
    ///
    /// Returns `AppError::KindMismatch` if `reading.kind != kind`; the view is
    /// left untouched in that case.
    fn set_current_reading(&mut self, kind: ReadingKind, reading: Reading) -> AppResult<()>;

    /// Replace the dataset for `kind`.
    fn set_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>);

    /// Extend the dataset for `kind`.
    fn append_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>);
}
