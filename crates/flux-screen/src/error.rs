use flux_transform::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScreenError {
    /// A mask or flag array does not have one entry per value.
    #[error("{argument} has {actual} entries but the variable has {expected}")]
    InvalidArgumentShape {
        argument: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

pub type Result<T> = std::result::Result<T, ScreenError>;
