//! Error taxonomy for remote-model calls.
//!
//! Raw transport and parse errors are logged at the call boundary and
//! normalized into these user-facing variants; they are never surfaced
//! verbatim. There is no retry logic; a failed call requires an explicit
//! user-initiated retry.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AiError {
    /// Analysis requested with zero transactions (categorized variant only;
    /// the ledger variant short-circuits instead).
    #[error("No transactions to analyze.")]
    EmptyInput,

    /// Transport failure, empty response, or malformed payload during an
    /// analysis call, collapsed into one user-facing message.
    #[error("The AI failed to analyze the financial data. Please try again.")]
    AnalysisFailed,

    /// A chat turn failed to complete. The caller appends the canned apology
    /// to the transcript instead of showing this error.
    #[error("Failed to send chat message.")]
    SendFailed,
}
