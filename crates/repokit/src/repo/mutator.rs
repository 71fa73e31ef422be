use crate::builder::{DeleteOptions, MutatorQuery};
use crate::checker::{ErrorChecker, apply_checker};
use crate::client::{ExecResult, Preparer};
use crate::entity::{InsertedValues, Mutator};
use crate::error::RepoResult;
use crate::exec;
use crate::query::{Projection, Selector, Update};
use std::marker::PhantomData;
use std::sync::Arc;

/// Write-side repository for entity `E`, building SQL with `B`.
pub struct MutatorRepo<E, B> {
    builder: B,
    checker: Option<Arc<dyn ErrorChecker>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, B: Clone> Clone for MutatorRepo<E, B> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            checker: self.checker.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E, B> MutatorRepo<E, B>
where
    E: Mutator,
    B: MutatorQuery,
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

    fn rows_affected(&self, result: &ExecResult) -> RepoResult<u64> {
        result
            .rows_affected()
            .map_err(|err| apply_checker(self.checker(), err))
    }

    /// Insert `entity` and hand it back.
    ///
    /// Fails if the statement fails or if the driver could not report the
    /// generated id; both go through the error checker.
    pub async fn insert<P: Preparer>(&self, preparer: &P, entity: E) -> RepoResult<E> {
        let built = self
            .builder
            .insert(entity.table_name(), &entity.inserted_values())?;
        let result = exec::exec(preparer, &built.sql, &built.params, self.checker()).await?;
        result
            .last_insert_id()
            .map_err(|err| apply_checker(self.checker(), err))?;
        Ok(entity)
    }

    /// Apply `updates` to rows of `entity`'s table matching `selectors`.
    pub async fn update<P: Preparer>(
        &self,
        preparer: &P,
        entity: &E,
        selectors: &[Selector],
        updates: &[Update],
    ) -> RepoResult<u64> {
        let built = self
            .builder
            .update(entity.table_name(), updates, selectors)?;
        let result = exec::exec(preparer, &built.sql, &built.params, self.checker()).await?;
        self.rows_affected(&result)
    }

    /// Delete rows of `entity`'s table matching `selectors`.
    pub async fn delete<P: Preparer>(
        &self,
        preparer: &P,
        entity: &E,
        selectors: &[Selector],
        opts: &DeleteOptions,
    ) -> RepoResult<u64> {
        let built = self
            .builder
            .delete(entity.table_name(), selectors, opts)?;
        let result = exec::exec(preparer, &built.sql, &built.params, self.checker()).await?;
        self.rows_affected(&result)
    }

    /// Insert every entity in one statement. An empty slice is a no-op.
    pub async fn insert_many<P: Preparer>(&self, preparer: &P, entities: &[E]) -> RepoResult<u64> {
        let Some(first) = entities.first() else {
            return Ok(0);
        };
        let rows: Vec<InsertedValues> = entities.iter().map(Mutator::inserted_values).collect();
        let built = self.builder.insert_many(first.table_name(), &rows)?;
        let result = exec::exec(preparer, &built.sql, &built.params, self.checker()).await?;
        self.rows_affected(&result)
    }

    /// Insert every entity, updating `update_projections` on rows that
    /// collide on `conflict_columns`. An empty slice is a no-op.
    pub async fn upsert_many<P: Preparer>(
        &self,
        preparer: &P,
        entities: &[E],
        update_projections: &[Projection],
        conflict_columns: &[&str],
    ) -> RepoResult<u64> {
        let Some(first) = entities.first() else {
            return Ok(0);
        };
        let rows: Vec<InsertedValues> = entities.iter().map(Mutator::inserted_values).collect();
        let built = self.builder.upsert_many(
            first.table_name(),
            &rows,
            update_projections,
            conflict_columns,
        )?;
        let result = exec::exec(preparer, &built.sql, &built.params, self.checker()).await?;
        self.rows_affected(&result)
    }
}
