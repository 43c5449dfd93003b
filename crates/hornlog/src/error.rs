use thiserror::Error;

use crate::diagnostic::Diagnostic;

#[derive(Debug, Error)]
pub enum Error {
    /// The surface syntax of a rule set or query was malformed. Carries a
    /// rendered source excerpt pointing at the offending span.
    #[error("Parse error: {0}")]
    Parse(Diagnostic),
}

pub type Result<T> = std::result::Result<T, Error>;
