//! Entity derive macro implementation

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

use crate::sql_ident::{parse_sql_ident, parse_table_name};

struct FieldSpec {
    ident: syn::Ident,
    column: String,
    skip_insert: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let table = get_table_name(&input)?;
    let specs = fields
        .iter()
        .map(field_spec)
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for (spec, field) in specs.iter().zip(fields.iter()) {
        if !seen.insert(spec.column.as_str()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate column '{}'", spec.column),
            ));
        }
    }

    let scans = specs.iter().map(|spec| {
        let ident = &spec.ident;
        let column = &spec.column;
        quote! {
            self.#ident = row.try_get_column(#column)?;
        }
    });

    let inserted: Vec<_> = specs.iter().filter(|spec| !spec.skip_insert).collect();
    let insert_columns = inserted.iter().map(|spec| &spec.column);
    let insert_values = inserted.iter().map(|spec| {
        let ident = &spec.ident;
        quote! {
            ::repokit::Value::from(::std::clone::Clone::clone(&self.#ident))
        }
    });

    Ok(quote! {
        impl #impl_generics ::repokit::TableNamer for #name #ty_generics #where_clause {
            fn table_name(&self) -> &str {
                #table
            }
        }

        impl #impl_generics ::repokit::Getter for #name #ty_generics #where_clause {
            fn scan_row(&mut self, row: &dyn ::repokit::Row) -> ::repokit::RepoResult<()> {
                use ::repokit::RowExt as _;
                #(#scans)*
                Ok(())
            }
        }

        impl #impl_generics ::repokit::Mutator for #name #ty_generics #where_clause {
            fn inserted_values(&self) -> ::repokit::InsertedValues {
                (
                    ::std::vec![#(::std::string::String::from(#insert_columns)),*],
                    ::std::vec![#(#insert_values),*],
                )
            }
        }
    })
}

fn get_table_name(input: &DeriveInput) -> Result<String> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("repo") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: LitStr = meta.value()?.parse()?;
                table = Some(parse_table_name(&lit)?);
                Ok(())
            } else {
                Err(meta.error("unsupported struct attribute, expected `table`"))
            }
        })?;
    }
    table.ok_or_else(|| {
        syn::Error::new_spanned(
            input,
            "Entity requires #[repo(table = \"table_name\")] attribute",
        )
    })
}

fn field_spec(field: &syn::Field) -> Result<FieldSpec> {
    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let mut column = None;
    let mut skip_insert = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("repo") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                column = Some(parse_sql_ident(&lit, "column")?);
                Ok(())
            } else if meta.path.is_ident("skip_insert") {
                skip_insert = true;
                Ok(())
            } else {
                Err(meta.error("unsupported field attribute, expected `column` or `skip_insert`"))
            }
        })?;
    }

    let column = column.unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());
    Ok(FieldSpec {
        ident,
        column,
        skip_insert,
    })
}
