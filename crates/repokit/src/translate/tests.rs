use super::*;
use crate::query::{OrderDirection, Page, Predicate, Selector};
use crate::value::Value;
use serde_json::json;

fn user_fields() -> ApiToDbFields {
    ApiToDbFields::new()
        .field("age", "users", "age")
        .field("name", "users", "name")
        .field("team", "teams", "title")
}

#[test]
fn test_selector_translates_to_db_selector() {
    let selectors = ApiSelectors::new().add("age", "eq", 18_i64);
    let out = selectors.to_db_selectors(&user_fields()).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(
        out[0],
        Selector {
            table: "users".into(),
            column: "age".into(),
            predicate: Predicate::Equal,
            value: Value::Int(18),
        }
    );
}

#[test]
fn test_unknown_selector_field_is_rejected() {
    let selectors = ApiSelectors::new().add("unknown", "eq", 1_i64);
    let err = selectors.to_db_selectors(&user_fields()).unwrap_err();

    assert_eq!(
        err,
        TranslateError::InvalidSelectorField {
            field: "unknown".into()
        }
    );
    assert_eq!(err.field(), Some("unknown"));
    assert!(err.is_field_not_allowed());
}

#[test]
fn test_unknown_order_and_update_fields_are_rejected() {
    let fields = user_fields();

    let err = ApiOrders::new()
        .add("salary", "asc")
        .to_db_orders(&fields)
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_ORDER_FIELD");

    let err = ApiUpdates::new()
        .add("password", "x")
        .to_db_updates(&fields)
        .unwrap_err();
    assert_eq!(
        err,
        TranslateError::InvalidUpdateField {
            field: "password".into()
        }
    );
}

#[test]
fn test_predicate_aliases_are_case_insensitive() {
    for token in ["GT", "gt", "Gt", ">"] {
        assert_eq!(parse_predicate(token).unwrap(), Predicate::Greater, "{token}");
    }
    for token in ["LT", "lt", "<"] {
        assert_eq!(parse_predicate(token).unwrap(), Predicate::Less, "{token}");
    }
    assert_eq!(parse_predicate("GE").unwrap(), Predicate::GreaterOrEqual);
    assert_eq!(parse_predicate("le").unwrap(), Predicate::LessOrEqual);
    assert_eq!(parse_predicate("EQ").unwrap(), Predicate::Equal);
    assert_eq!(parse_predicate("!=").unwrap(), Predicate::NotEqual);
    assert_eq!(parse_predicate("IN").unwrap(), Predicate::In);
    assert_eq!(parse_predicate("Not_In").unwrap(), Predicate::NotIn);
    assert_eq!(parse_predicate("LIKE").unwrap(), Predicate::Like);
    assert_eq!(parse_predicate("not_like").unwrap(), Predicate::NotLike);
}

#[test]
fn test_invalid_predicate_keeps_original_token() {
    let err = parse_predicate("Between").unwrap_err();
    assert_eq!(
        err,
        TranslateError::InvalidPredicate {
            predicate: "Between".into()
        }
    );

    let selectors = ApiSelectors::new().add("age", "~", 1_i64);
    assert_eq!(
        selectors.to_db_selectors(&user_fields()).unwrap_err().code(),
        "INVALID_PREDICATE"
    );
}

#[test]
fn test_order_directions() {
    assert_eq!(parse_direction("f", "ASC").unwrap(), OrderDirection::Asc);
    assert_eq!(parse_direction("f", "ascending").unwrap(), OrderDirection::Asc);
    assert_eq!(parse_direction("f", "Desc").unwrap(), OrderDirection::Desc);
    assert_eq!(
        parse_direction("f", "DESCENDING").unwrap(),
        OrderDirection::Desc
    );
    assert_eq!(
        parse_direction("name", "sideways").unwrap_err(),
        TranslateError::InvalidOrderDirection {
            field: "name".into(),
            direction: "sideways".into()
        }
    );
}

#[test]
fn test_orders_follow_field_name_order() {
    let orders = ApiOrders::new().add("team", "desc").add("age", "asc");
    let out = orders.to_db_orders(&user_fields()).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!((out[0].table.as_str(), out[0].field.as_str()), ("users", "age"));
    assert_eq!(out[0].direction, OrderDirection::Asc);
    assert_eq!((out[1].table.as_str(), out[1].field.as_str()), ("teams", "title"));
    assert_eq!(out[1].direction, OrderDirection::Desc);
}

#[test]
fn test_get_input_default_page() {
    let input = parse_get_input(
        &user_fields(),
        &ApiSelectors::new(),
        &ApiOrders::new(),
        None,
        50,
        true,
    )
    .unwrap();

    assert_eq!(input.page(), Page::new(0, 50));
    assert!(input.count());
    assert!(input.selectors().is_empty());
    assert_eq!(input.get_options().page, Some(Page::new(0, 50)));
    assert_eq!(input.count_options().page, None);
}

#[test]
fn test_get_input_page_limit() {
    let fields = user_fields();
    let empty = ApiSelectors::new();
    let no_orders = ApiOrders::new();

    let ok = parse_get_input(&fields, &empty, &no_orders, Some(Page::new(20, 50)), 50, false)
        .unwrap();
    assert_eq!(ok.page(), Page::new(20, 50));
    assert!(!ok.count());

    let err = parse_get_input(&fields, &empty, &no_orders, Some(Page::new(0, 51)), 50, false)
        .unwrap_err();
    assert_eq!(err, TranslateError::MaxPageLimitExceeded { max_limit: 50 });
}

#[test]
fn test_get_input_zero_limit_is_capped() {
    let fields = user_fields();
    let input = parse_get_input(
        &fields,
        &ApiSelectors::new(),
        &ApiOrders::new(),
        Some(Page::new(0, 0)),
        50,
        false,
    )
    .unwrap();
    assert_eq!(input.page(), Page::new(0, 50));

    let input = parse_get_input(
        &fields,
        &ApiSelectors::new(),
        &ApiOrders::new(),
        Some(Page::new(10, 0)),
        50,
        false,
    )
    .unwrap();
    assert_eq!(input.get_options().page, Some(Page::new(10, 50)));
}

#[test]
fn test_get_input_propagates_translation_errors() {
    let err = parse_get_input(
        &user_fields(),
        &ApiSelectors::new().add("age", "eq", 1_i64),
        &ApiOrders::new().add("age", "up"),
        None,
        10,
        false,
    )
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_ORDER_DIRECTION");
}

#[test]
fn test_update_input_requires_selector_and_update() {
    let fields = user_fields();

    let err = parse_update_input(
        &fields,
        &ApiSelectors::new(),
        &ApiUpdates::new().add("name", "bob"),
        false,
    )
    .unwrap_err();
    assert_eq!(err, TranslateError::NeedAtLeastOneSelector);

    let err = parse_update_input(
        &fields,
        &ApiSelectors::new().add("age", "eq", 3_i64),
        &ApiUpdates::new(),
        false,
    )
    .unwrap_err();
    assert_eq!(err, TranslateError::NeedAtLeastOneUpdate);

    let ok = parse_update_input(
        &fields,
        &ApiSelectors::new().add("age", "eq", 3_i64),
        &ApiUpdates::new().add("name", "bob"),
        true,
    )
    .unwrap();
    assert_eq!(ok.selectors().len(), 1);
    assert_eq!(ok.updates()[0].field, "name");
    assert_eq!(ok.updates()[0].value, Value::from("bob"));
    assert!(ok.upsert());
}

#[test]
fn test_delete_input_requires_selector() {
    let fields = user_fields();

    let err = parse_delete_input(&fields, &ApiSelectors::new(), &ApiOrders::new(), None)
        .unwrap_err();
    assert_eq!(err, TranslateError::NeedAtLeastOneSelector);

    let ok = parse_delete_input(
        &fields,
        &ApiSelectors::new().add("age", "lt", 10_i64),
        &ApiOrders::new().add("name", "desc"),
        Some(5),
    )
    .unwrap();
    assert_eq!(ok.selectors()[0].predicate, Predicate::Less);
    assert_eq!(ok.delete_options().limit, Some(5));
    assert_eq!(ok.delete_options().orders[0].field, "name");
}

#[test]
fn test_predicate_restrictions() {
    let selectors = ApiSelectors::new()
        .add("age", "gt", 18_i64)
        .add("name", "eq", "bob");

    selectors
        .check_predicates([("age", PredicateSet::ONLY_GREATER), ("name", PredicateSet::ONLY_EQUAL)])
        .unwrap();

    let err = selectors
        .check_predicates([("age", PredicateSet::EQUAL_AND_NOT_EQUAL)])
        .unwrap_err();
    assert_eq!(
        err,
        TranslateError::PredicateNotAllowed {
            field: "age".into(),
            predicate: "gt".into()
        }
    );

    // Rules for absent fields are ignored.
    selectors
        .check_predicates([("team", PredicateSet::ONLY_IN_AND_NOT_IN)])
        .unwrap();
    assert!(PredicateSet::ALL.allows(Predicate::NotLike));
    assert!(!PredicateSet::ONLY_LESS.allows(Predicate::Greater));
}

#[test]
fn test_api_input_from_json() {
    let selectors: ApiSelectors = serde_json::from_value(json!({
        "age": {"predicate": "ge", "value": 21},
        "name": {"predicate": "in", "value": ["ann", "bob"]}
    }))
    .unwrap();
    let orders: ApiOrders = serde_json::from_value(json!({"age": "desc"})).unwrap();
    let page: Page = serde_json::from_value(json!({"limit": 5})).unwrap();

    let input = parse_get_input(&user_fields(), &selectors, &orders, Some(page), 10, false).unwrap();
    assert_eq!(input.selectors().len(), 2);
    assert_eq!(input.selectors()[1].predicate, Predicate::In);
    assert_eq!(
        input.selectors()[1].value,
        Value::list(["ann", "bob"])
    );
    assert_eq!(input.page(), Page::new(0, 5));
}

#[test]
fn test_error_serializes_with_code() {
    let err = TranslateError::InvalidSelectorField {
        field: "unknown".into(),
    };
    assert_eq!(
        serde_json::to_value(&err).unwrap(),
        json!({"code": "INVALID_SELECTOR_FIELD", "data": {"field": "unknown"}})
    );
    assert_eq!(err.to_string(), "cannot translate selector field: unknown");
}
