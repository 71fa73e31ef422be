use crate::checker::ErrorChecker;
use crate::error::RepoError;

/// Maps PostgreSQL constraint violations to their [`RepoError`] variants.
///
/// | SQLSTATE | variant                            |
/// |----------|------------------------------------|
/// | `23505`  | [`RepoError::UniqueViolation`]     |
/// | `23503`  | [`RepoError::ForeignKeyViolation`] |
/// | `23514`  | [`RepoError::CheckViolation`]      |
///
/// Everything else passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgErrorChecker;

impl ErrorChecker for PgErrorChecker {
    fn check(&self, err: RepoError) -> RepoError {
        let RepoError::Execute(source) = err else {
            return err;
        };
        let Some(db_err) = source
            .downcast_ref::<tokio_postgres::Error>()
            .and_then(tokio_postgres::Error::as_db_error)
        else {
            return RepoError::Execute(source);
        };

        let code = db_err.code().clone();
        let detail = format!(
            "{}: {}",
            db_err.constraint().unwrap_or("unknown"),
            db_err.message()
        );
        match code.code() {
            "23505" => RepoError::UniqueViolation(detail),
            "23503" => RepoError::ForeignKeyViolation(detail),
            "23514" => RepoError::CheckViolation(detail),
            _ => RepoError::Execute(source),
        }
    }
}
