//! Status returned by behaviour nodes

use serde::{Deserialize, Serialize};

/// The result of evaluating a behaviour node
///
/// A node is `Invalid` only before its first tick or after an external
/// reset; once ticked it stays Success/Failure/Running until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Not yet ticked (or externally reset)
    Invalid,
    /// Still working; control returns to this node next frame
    Running,
    /// The behaviour completed successfully
    Success,
    /// The behaviour completed without achieving its goal
    ///
    /// This is the normal fallback channel, not an error.
    Failure,
}

impl Status {
    /// Returns `true` for Success or Failure
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Success | Status::Failure)
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Success becomes Failure and vice versa; Running and Invalid pass
    /// through unchanged
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(Status::Success.is_terminal());
        assert!(Status::Failure.is_terminal());
        assert!(!Status::Running.is_terminal());
        assert!(!Status::Invalid.is_terminal());
    }

    #[test]
    fn test_invert_leaves_running_untouched() {
        assert_eq!(Status::Success.invert(), Status::Failure);
        assert_eq!(Status::Failure.invert(), Status::Success);
        assert_eq!(Status::Running.invert(), Status::Running);
        assert_eq!(Status::Invalid.invert(), Status::Invalid);
    }
}
