//! Frame statistics.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `record` | [`FrameStats`], [`StatsPatch`] and their enums |
//! | `fps` | Arrival-rate fps derivation |
//! | `display` | Stats panel formatting |

// ============================================================================
// Submodules
// ============================================================================

/// Stats panel formatting.
pub mod display;

/// Arrival-rate fps derivation.
pub mod fps;

/// Statistics record and patches.
pub mod record;

// ============================================================================
// Re-exports
// ============================================================================

pub use display::{FormattedStats, group_thousands};
pub use fps::{arrival_fps, round1};
pub use record::{ConnectionQuality, FrameStats, StatsPatch, ViewMode};
