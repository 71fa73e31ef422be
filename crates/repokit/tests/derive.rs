#![cfg(feature = "derive")]

use repokit::{Entity, Getter, Mutator, RepoError, TableNamer, Value, ValueRow};

#[derive(Debug, Default, PartialEq, Entity)]
#[repo(table = "app.accounts")]
struct Account {
    #[repo(skip_insert)]
    id: i64,
    #[repo(column = "display_name")]
    name: String,
    email: Option<String>,
    r#type: String,
}

#[test]
fn table_name_from_attribute() {
    assert_eq!(Account::default().table_name(), "app.accounts");
}

#[test]
fn inserted_values_skip_generated_columns() {
    let account = Account {
        id: 9,
        name: "Alice".into(),
        email: None,
        r#type: "admin".into(),
    };

    let (columns, values) = account.inserted_values();
    assert_eq!(columns, ["display_name", "email", "type"]);
    assert_eq!(
        values,
        vec![Value::from("Alice"), Value::Null, Value::from("admin")]
    );
}

#[test]
fn scan_row_by_column_name() {
    let row = ValueRow::new()
        .with("type", "user")
        .with("email", "bob@example.com")
        .with("display_name", "Bob")
        .with("id", 2_i64);

    let mut account = Account::default();
    account.scan_row(&row).unwrap();
    assert_eq!(
        account,
        Account {
            id: 2,
            name: "Bob".into(),
            email: Some("bob@example.com".into()),
            r#type: "user".into(),
        }
    );
}

#[test]
fn scan_row_reports_missing_column() {
    let row = ValueRow::new().with("id", 1_i64);
    let err = Account::default().scan_row(&row).unwrap_err();
    assert!(matches!(err, RepoError::Decode { ref column, .. } if column == "display_name"));
}
