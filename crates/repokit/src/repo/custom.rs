use crate::checker::ErrorChecker;
use crate::client::Preparer;
use crate::error::RepoResult;
use crate::exec;
use crate::row::Row;
use crate::value::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Repository for hand-written SQL with an arbitrary result shape.
pub struct CustomRepo<T> {
    checker: Option<Arc<dyn ErrorChecker>>,
    _result: PhantomData<fn() -> T>,
}

impl<T> Default for CustomRepo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CustomRepo<T> {
    fn clone(&self) -> Self {
        Self {
            checker: self.checker.clone(),
            _result: PhantomData,
        }
    }
}

impl<T> CustomRepo<T> {
    pub fn new() -> Self {
        Self {
            checker: None,
            _result: PhantomData,
        }
    }

    pub fn with_error_checker(mut self, checker: impl ErrorChecker + 'static) -> Self {
        self.checker = Some(Arc::new(checker));
        self
    }

    /// Run `sql` and map each row with `map`.
    pub async fn query_custom<P, M>(
        &self,
        preparer: &P,
        sql: &str,
        params: &[Value],
        map: M,
    ) -> RepoResult<Vec<T>>
    where
        P: Preparer,
        M: FnMut(&dyn Row) -> RepoResult<T>,
    {
        exec::query_map(preparer, sql, params, self.checker.as_deref(), map).await
    }
}
