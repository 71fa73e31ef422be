use crate::builder::{CountOptions, GetOptions, ReaderQuery};
use crate::checker::ErrorChecker;
use crate::client::Preparer;
use crate::entity::Getter;
use crate::error::RepoResult;
use crate::exec;
use crate::query::{Page, Selectors};
use crate::value::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Read-side repository for entity `E`, building SQL with `B`.
///
/// Table names come from a throwaway entity produced by the factory, so the
/// same repository works for any table `E` can name.
pub struct ReaderRepo<E, B> {
    builder: B,
    checker: Option<Arc<dyn ErrorChecker>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, B: Clone> Clone for ReaderRepo<E, B> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            checker: self.checker.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, B> ReaderRepo<E, B>
where
    E: Getter,
    B: ReaderQuery,
{
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            checker: None,
            _entity: PhantomData,
        }
    }

    /// Translate execution errors with `checker`.
    pub fn with_error_checker(mut self, checker: impl ErrorChecker + 'static) -> Self {
        self.checker = Some(Arc::new(checker));
        self
    }

    /// Share an existing checker.
    pub fn with_shared_error_checker(mut self, checker: Arc<dyn ErrorChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    fn checker(&self) -> Option<&dyn ErrorChecker> {
        self.checker.as_deref()
    }

    /// First row matching `opts`; [`RepoError::NotFound`](crate::RepoError::NotFound) when none.
    pub async fn get_one<P, F>(&self, preparer: &P, factory: F, opts: &GetOptions) -> RepoResult<E>
    where
        P: Preparer,
        F: Fn() -> E,
    {
        let table = factory().table_name().to_string();
        let built = self.builder.get(&table, opts)?;
        exec::query_to_one(preparer, &built.sql, &built.params, self.checker(), factory).await
    }

    /// Every row matching `opts`.
    pub async fn get_many<P, F>(
        &self,
        preparer: &P,
        factory: F,
        opts: &GetOptions,
    ) -> RepoResult<Vec<E>>
    where
        P: Preparer,
        F: Fn() -> E,
    {
        let table = factory().table_name().to_string();
        let built = self.builder.get(&table, opts)?;
        exec::query_to_many(preparer, &built.sql, &built.params, self.checker(), factory).await
    }

    /// Number of rows matching `selectors`.
    pub async fn count<P, F>(
        &self,
        preparer: &P,
        selectors: &Selectors,
        page: Option<Page>,
        factory: F,
    ) -> RepoResult<i64>
    where
        P: Preparer,
        F: Fn() -> E,
    {
        let table = factory().table_name().to_string();
        let opts = CountOptions {
            selectors: selectors.clone(),
            page,
            ..CountOptions::default()
        };
        let built = self.builder.count(&table, &opts)?;
        exec::query_scalar(preparer, &built.sql, &built.params, self.checker()).await
    }

    /// Run caller-supplied SQL and scan every row into `E`.
    pub async fn query<P, F>(
        &self,
        preparer: &P,
        sql: &str,
        params: &[Value],
        factory: F,
    ) -> RepoResult<Vec<E>>
    where
        P: Preparer,
        F: Fn() -> E,
    {
        exec::query_to_many(preparer, sql, params, self.checker(), factory).await
    }
}
