use super::TranslateError;
use super::fields::{ApiOrders, ApiSelectors, ApiToDbFields, ApiUpdates};
use crate::builder::{CountOptions, DeleteOptions, GetOptions};
use crate::query::{Order, Page, Selectors, Updates};

/// Validated input of a read endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGetInput {
    selectors: Selectors,
    orders: Vec<Order>,
    page: Page,
    count: bool,
}

impl ParsedGetInput {
    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn page(&self) -> Page {
        self.page
    }

    /// Whether the caller also asked for the total count.
    pub fn count(&self) -> bool {
        self.count
    }

    /// Options for [`ReaderQuery::get`](crate::ReaderQuery::get).
    pub fn get_options(&self) -> GetOptions {
        GetOptions {
            selectors: self.selectors.clone(),
            orders: self.orders.clone(),
            page: Some(self.page),
            ..GetOptions::default()
        }
    }

    /// Options for [`ReaderQuery::count`](crate::ReaderQuery::count).
    ///
    /// The page is left out so the count covers every matching row.
    pub fn count_options(&self) -> CountOptions {
        CountOptions {
            selectors: self.selectors.clone(),
            ..CountOptions::default()
        }
    }
}

/// Validated input of an update endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUpdateInput {
    selectors: Selectors,
    updates: Updates,
    upsert: bool,
}

impl ParsedUpdateInput {
    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn updates(&self) -> &Updates {
        &self.updates
    }

    pub fn upsert(&self) -> bool {
        self.upsert
    }
}

/// Validated input of a delete endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDeleteInput {
    selectors: Selectors,
    delete_options: DeleteOptions,
}

impl ParsedDeleteInput {
    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn delete_options(&self) -> &DeleteOptions {
        &self.delete_options
    }
}

/// Translate read-endpoint input.
///
/// Without an explicit page the window is `{0, max_page}`. An explicit page
/// may not ask for more than `max_page` rows; a zero limit means `max_page`.
pub fn parse_get_input(
    fields: &ApiToDbFields,
    selectors: &ApiSelectors,
    orders: &ApiOrders,
    page: Option<Page>,
    max_page: u64,
    count: bool,
) -> Result<ParsedGetInput, TranslateError> {
    let orders = orders.to_db_orders(fields)?;
    let page = match page {
        Some(page) if page.limit > max_page => {
            return Err(TranslateError::MaxPageLimitExceeded {
                max_limit: max_page,
            });
        }
        Some(page) if page.limit == 0 => Page::new(page.offset, max_page),
        Some(page) => page,
        None => Page::new(0, max_page),
    };
    let selectors = selectors.to_db_selectors(fields)?;
    Ok(ParsedGetInput {
        selectors,
        orders,
        page,
        count,
    })
}

/// Translate update-endpoint input. Needs at least one selector and one update.
pub fn parse_update_input(
    fields: &ApiToDbFields,
    selectors: &ApiSelectors,
    updates: &ApiUpdates,
    upsert: bool,
) -> Result<ParsedUpdateInput, TranslateError> {
    let selectors = selectors.to_db_selectors(fields)?;
    if selectors.is_empty() {
        return Err(TranslateError::NeedAtLeastOneSelector);
    }
    let updates = updates.to_db_updates(fields)?;
    if updates.is_empty() {
        return Err(TranslateError::NeedAtLeastOneUpdate);
    }
    Ok(ParsedUpdateInput {
        selectors,
        updates,
        upsert,
    })
}

/// Translate delete-endpoint input. Needs at least one selector.
pub fn parse_delete_input(
    fields: &ApiToDbFields,
    selectors: &ApiSelectors,
    orders: &ApiOrders,
    limit: Option<u64>,
) -> Result<ParsedDeleteInput, TranslateError> {
    let selectors = selectors.to_db_selectors(fields)?;
    if selectors.is_empty() {
        return Err(TranslateError::NeedAtLeastOneSelector);
    }
    let orders = orders.to_db_orders(fields)?;
    Ok(ParsedDeleteInput {
        selectors,
        delete_options: DeleteOptions { limit, orders },
    })
}
