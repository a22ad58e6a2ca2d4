/// Reasons why a decomposition cannot be computed.
#[derive(Clone, Debug, PartialEq)]
pub enum DecompositionError {
    /// At least two observations (ion images) are needed.
    TooFewObservations { found: usize },
    /// `requested` components exceed `min(rows, cols)`.
    InvalidComponents { requested: usize, max: usize },
    EmptyMask,
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// NMF input contains negative values.
    NegativeInput,
}

impl std::fmt::Display for DecompositionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecompositionError::TooFewObservations { found } => {
                write!(f, "need at least 2 ion images, got {found}")
            }
            DecompositionError::InvalidComponents { requested, max } => {
                write!(f, "{requested} components requested but at most {max} are possible")
            }
            DecompositionError::EmptyMask => write!(f, "fusion mask selects no pixel"),
            DecompositionError::ShapeMismatch {
                what,
                expected,
                found,
            } => write!(f, "{what}: expected {expected} values, found {found}"),
            DecompositionError::NegativeInput => {
                write!(f, "non-negative factorisation given negative intensities")
            }
        }
    }
}

impl std::error::Error for DecompositionError {}
