use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro for named-field row shapes.
///
/// Generates `impl FromRow` whose `shape()` registers one member per field:
/// the column name it binds to and a setter that coerces the column value
/// into the field's type through `FromValue`. The table is built at compile
/// time, so no per-row name lookup happens.
///
/// The struct must implement `Default` (fields without a matching column
/// keep their default).
///
/// # Example
///
/// ```ignore
/// #[derive(FromRow, Default)]
/// pub struct FooBar {
///     #[row(rename = "Foo")]
///     pub foo: i32,
///
///     #[row(rename = "Bar")]
///     pub bar: Option<String>,
///
///     #[row(skip)]
///     pub note: String,
/// }
/// ```
///
/// Without `rename`, the field name itself is the column name (matched exactly).
#[proc_macro_derive(FromRow, attributes(row))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "FromRow only supports structs with named fields",
                ));
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "FromRow only supports structs")),
    };

    let mut member_tokens = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;

        // Parse #[row(...)] attribute.
        let mut column: Option<String> = None;
        let mut skip = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("row") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    column = Some(value.value());
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else {
                    return Err(meta.error("unknown row attribute (expected 'rename' or 'skip')"));
                }
                Ok(())
            })?;
        }

        if skip {
            if column.is_some() {
                return Err(syn::Error::new_spanned(
                    field_name,
                    "'skip' and 'rename' are mutually exclusive",
                ));
            }
            continue;
        }

        let column = column.unwrap_or_else(|| field_name.to_string());

        member_tokens.push(quote! {
            rowset_api::mapping::Member::new(
                #column,
                |__target: &mut Self, __value: rowset_api::value::Value| {
                    __target.#field_name = rowset_api::value::FromValue::from_value(__value)?;
                    Ok(())
                },
            )
        });
    }

    let expanded = quote! {
        impl #impl_generics rowset_api::converter::FromRow for #name #ty_generics #where_clause {
            fn shape() -> rowset_api::mapping::Shape<Self> {
                rowset_api::mapping::Shape::named(vec![
                    #(#member_tokens),*
                ])
            }
        }
    };

    Ok(TokenStream::from(expanded))
}
