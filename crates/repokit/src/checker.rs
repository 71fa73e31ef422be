//! Error translation hook.

use crate::error::RepoError;

/// Converts a low-level execution error into a domain error.
///
/// Applied to every driver error (prepare, execute, row fetch) and to scan,
/// not-found and result-metadata errors. Translation and missing-handle errors
/// are never passed through a checker.
pub trait ErrorChecker: Send + Sync {
    fn check(&self, err: RepoError) -> RepoError;
}

impl<F> ErrorChecker for F
where
    F: Fn(RepoError) -> RepoError + Send + Sync,
{
    fn check(&self, err: RepoError) -> RepoError {
        self(err)
    }
}

/// Apply `checker` to `err`; `None` leaves it untouched.
pub fn apply_checker(checker: Option<&dyn ErrorChecker>, err: RepoError) -> RepoError {
    match checker {
        Some(checker) => checker.check(err),
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_checkers() {
        let checker = |err: RepoError| match err {
            RepoError::Execute(e) => RepoError::UniqueViolation(e.to_string()),
            other => other,
        };

        let out = apply_checker(Some(&checker), RepoError::execute("dup key"));
        assert!(out.is_unique_violation());

        let out = apply_checker(None, RepoError::execute("dup key"));
        assert!(matches!(out, RepoError::Execute(_)));
    }
}
