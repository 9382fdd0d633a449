use crate::readings::ReadingKind;

/// Display labels for reading kinds.
pub trait Localization: Send + Sync {
    fn label(&self, kind: ReadingKind) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalization;

impl Localization for EnglishLocalization {
    fn label(&self, kind: ReadingKind) -> &str {
        match kind {
            ReadingKind::Temperature => "Temperature",
            ReadingKind::Humidity => "Humidity",
        }
    }
}
