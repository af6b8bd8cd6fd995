//! Ordered fallback-chain resolution with success and failure memoization
//!
//! A `FallbackResolver` is handed an ordered list of candidate sources per key and
//! an injected `Attempt` predicate. It tries candidates first-to-last, remembers the
//! one that worked, and remembers keys whose whole chain failed so they are never
//! retried until reset. It holds no transport logic of its own.

mod attempt;
mod chain;

pub use attempt::{Attempt, AttemptOutcome, FnAttempt};
pub use chain::{FallbackResolver, PreloadReport, ResolutionState, ResolverStats};
