//! Window selection, coordinate resolution, and the centering protocol.

pub mod center;
pub mod placement;
pub mod resolver;
pub mod selection;

pub use center::{CenterEngine, Centered, WriteStrategy};
pub use selection::SelectionPolicy;
use thiserror::Error;

/// Why a centering attempt did not move a window. None of these are fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CenterError {
    #[error("accessibility permission has not been granted")]
    PermissionMissing,
    #[error("no application is frontmost")]
    NoFrontmostApplication,
    #[error("no window to center")]
    NoWindow,
    #[error("window is full screen")]
    Fullscreen,
    #[error("unable to read the window frame")]
    UnableToReadFrame,
    #[error("unable to write the window position")]
    UnableToWritePosition,
}

impl CenterError {
    /// Deliberate skips that are never reported to the user.
    pub fn is_silent(&self) -> bool { matches!(self, CenterError::Fullscreen) }

    /// Conditions a later automatic attempt may get past.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CenterError::NoWindow
                | CenterError::UnableToReadFrame
                | CenterError::UnableToWritePosition
        )
    }
}
