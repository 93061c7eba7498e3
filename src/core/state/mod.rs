mod app_state;
mod attempt;

pub use app_state::AppState;
pub use attempt::{AttemptCell, AttemptGuard, AttemptState};
