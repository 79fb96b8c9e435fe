// Derive macros for sqlx_named.
//
// `Record` wires a struct into the row-decoding engine (column list plus a
// name-dispatched setter), `Params` turns a struct into a named parameter
// bag, and `Joined` exposes the sub-records of a joined destination by
// ordinal index.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta, NestedMeta};

struct FieldSpec {
    column: String,
    ident: syn::Ident,
}

fn named_fields(input: &DeriveInput) -> Result<Vec<syn::Field>, syn::Error> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Ok(named.named.iter().cloned().collect()),
            _ => Err(syn::Error::new_spanned(
                &input.ident,
                "only structs with named fields are supported",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "only structs are supported",
        )),
    }
}

// Collect (column name, field) pairs for one attribute namespace
// (`row` for Record, `param` for Params). Supported forms:
//   #[row(skip)]
//   #[row(rename = "other_name")]
// The first declared field wins when two fields map to the same column.
fn field_specs(input: &DeriveInput, attr_name: &str) -> Result<Vec<FieldSpec>, syn::Error> {
    let mut specs: Vec<FieldSpec> = Vec::new();
    for field in named_fields(input)? {
        let ident = field.ident.clone().expect("named field");
        let mut column = ident.to_string();
        let mut skip = false;
        for attr in &field.attrs {
            if !attr.path.is_ident(attr_name) {
                continue;
            }
            if let Meta::List(list) = attr.parse_meta()? {
                for nested in list.nested {
                    match nested {
                        NestedMeta::Meta(Meta::Path(ref p)) if p.is_ident("skip") => {
                            skip = true;
                        }
                        NestedMeta::Meta(Meta::NameValue(ref nv)) if nv.path.is_ident("rename") => {
                            match &nv.lit {
                                Lit::Str(s) => column = s.value(),
                                other => {
                                    return Err(syn::Error::new_spanned(
                                        other,
                                        "rename expects a string literal",
                                    ))
                                }
                            }
                        }
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                format!("unknown `{}` attribute", attr_name),
                            ))
                        }
                    }
                }
            }
        }
        if skip {
            continue;
        }
        if specs.iter().any(|s| s.column == column) {
            continue;
        }
        specs.push(FieldSpec { column, ident });
    }
    Ok(specs)
}

/// Implements `sqlx_named::Record`: a static column list and a setter that
/// dispatches on the column name and converts through `FromSqlValue`.
#[proc_macro_derive(Record, attributes(row))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();
    let specs = match field_specs(&input, "row") {
        Ok(specs) => specs,
        Err(e) => return e.to_compile_error().into(),
    };
    let columns: Vec<String> = specs.iter().map(|s| s.column.clone()).collect();
    let idents: Vec<syn::Ident> = specs.iter().map(|s| s.ident.clone()).collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::sqlx_named::Record for #name #ty_generics #where_clause {
            fn columns(&self) -> &'static [&'static str] {
                &[#(#columns),*]
            }

            fn put(
                &mut self,
                column: &str,
                value: ::sqlx_named::SqlValue,
            ) -> ::std::result::Result<(), ::sqlx_named::Error> {
                match column {
                    #(
                        #columns => {
                            self.#idents = ::sqlx_named::FromSqlValue::from_sql(value)?;
                            ::std::result::Result::Ok(())
                        }
                    )*
                    _ => ::std::result::Result::Err(
                        ::sqlx_named::Error::ColumnNotFound(column.to_string()),
                    ),
                }
            }
        }
    };
    expanded.into()
}

/// Implements `sqlx_named::ParamRecord`: a by-name parameter lookup over the
/// struct's fields, converting through `ToSqlValue`.
#[proc_macro_derive(Params, attributes(param))]
pub fn params_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();
    let specs = match field_specs(&input, "param") {
        Ok(specs) => specs,
        Err(e) => return e.to_compile_error().into(),
    };
    let keys: Vec<String> = specs.iter().map(|s| s.column.clone()).collect();
    let idents: Vec<syn::Ident> = specs.iter().map(|s| s.ident.clone()).collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::sqlx_named::ParamRecord for #name #ty_generics #where_clause {
            fn param(&self, key: &str) -> ::std::option::Option<::sqlx_named::SqlValue> {
                match key {
                    #(
                        #keys => ::std::option::Option::Some(
                            ::sqlx_named::ToSqlValue::to_sql(&self.#idents),
                        ),
                    )*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
    expanded.into()
}

/// Implements `sqlx_named::Joined`: sub-records are the struct's fields in
/// declaration order, each of which must itself implement `Record`.
#[proc_macro_derive(Joined)]
pub fn joined_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();
    let fields = match named_fields(&input) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };
    let idents: Vec<syn::Ident> = fields
        .iter()
        .map(|f| f.ident.clone().expect("named field"))
        .collect();
    let indices: Vec<usize> = (0..idents.len()).collect();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::sqlx_named::Joined for #name #ty_generics #where_clause {
            fn join_index(
                &mut self,
                idx: usize,
            ) -> ::std::option::Option<&mut dyn ::sqlx_named::Record> {
                match idx {
                    #(#indices => ::std::option::Option::Some(&mut self.#idents),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
    expanded.into()
}
