//! Error types for the backdrop subsystem

use thiserror::Error;

/// Errors raised while probing, constructing, or configuring a backdrop strategy.
///
/// None of these ever reach the user: the renderer treats a failed strategy as
/// a missing capability and downgrades to a cheaper tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackdropError {
    /// The host refused to hand out a hardware-accelerated drawing context
    #[error("accelerated drawing context is unavailable")]
    ContextUnavailable,

    /// A shader failed to compile
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    /// The shader program failed to link
    #[error("shader program link failed: {0}")]
    ProgramLink(String),

    /// A GPU buffer or program object could not be created
    #[error("failed to allocate {0}")]
    ResourceAllocation(&'static str),

    /// A DOM operation (element creation, attachment) failed
    #[error("DOM operation failed: {0}")]
    Dom(String),

    /// A force mode string did not name a known mode
    #[error("unknown backdrop mode '{0}', expected auto, optimized, simple or none")]
    InvalidForceMode(String),
}

pub type BackdropResult<T> = Result<T, BackdropError>;
