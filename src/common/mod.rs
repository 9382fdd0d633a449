pub mod state;

pub use state::{AppState, CardPoller, SharedSensorsApi};
