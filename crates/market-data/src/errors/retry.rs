/// Classification for retry policy.
///
/// Used to decide how a wrapping retry layer should respond to an error
/// from the quote provider.
///
/// # Behavior Summary
///
/// | Class | Retry Same Request? |
/// |-------|---------------------|
/// | `Never` | No |
/// | `Retry` | Yes, within the caller's attempt budget |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - unknown symbol, empty data, or a malformed response.
    /// The request is fundamentally unanswerable and retrying won't help.
    Never,

    /// Retry the same request after the configured delay.
    ///
    /// Used for transient errors like rate limiting (429), timeouts, and
    /// network failures. The retry layer bounds the number of attempts;
    /// there is no backoff beyond the fixed inter-call delay.
    Retry,
}
