use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Expr, ExprLit, ExprUnary, Fields, Lit, LitStr, UnOp};

/// Derive macro making a fieldless enum usable as a conversion target.
///
/// Generates:
///
/// - `ConvertEnum` — a shared `EnumType` descriptor plus discriminant mapping.
/// - `FromValue` — so `Converter::convert_to::<MyEnum>()` works.
/// - `From<MyEnum> for Value` — wraps the variant as `Value::Enum`.
///
/// # Example
///
/// ```ignore
/// #[derive(ConvertEnum, Debug, PartialEq)]
/// #[convert(name = "Colour")]
/// pub enum Color {
///     Red = 1,
///     Green,
///     #[convert(rename = "Blau")]
///     Blue,
/// }
/// ```
///
/// Discriminants must be integer literals; omitted ones continue from the
/// previous variant, as in Rust itself.
#[proc_macro_derive(ConvertEnum, attributes(convert))]
pub fn derive_convert_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "ConvertEnum only supports enums",
            ))
        }
    };
    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "ConvertEnum needs at least one variant",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "ConvertEnum does not support generic enums",
        ));
    }

    let enum_name = convert_attr(&input.attrs, "name")?.unwrap_or_else(|| name.to_string());

    let mut idents = Vec::new();
    let mut member_names = Vec::new();
    let mut discriminants: Vec<i64> = Vec::new();
    let mut next: i64 = 0;

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "ConvertEnum only supports fieldless variants",
            ));
        }

        let value = match &variant.discriminant {
            Some((_, expr)) => literal_discriminant(expr)?,
            None => next,
        };
        next = value.checked_add(1).unwrap_or(value);

        let member = convert_attr(&variant.attrs, "rename")?
            .unwrap_or_else(|| variant.ident.to_string());

        idents.push(&variant.ident);
        member_names.push(member);
        discriminants.push(value);
    }

    Ok(quote! {
        impl ::harp_common::target::ConvertEnum for #name {
            fn enum_type() -> ::std::sync::Arc<::harp_common::target::EnumType> {
                static TYPE: ::std::sync::OnceLock<::std::sync::Arc<::harp_common::target::EnumType>> =
                    ::std::sync::OnceLock::new();
                ::std::sync::Arc::clone(TYPE.get_or_init(|| {
                    ::std::sync::Arc::new(::harp_common::target::EnumType::new(
                        #enum_name,
                        [#((#member_names, #discriminants)),*],
                    ))
                }))
            }

            fn discriminant(&self) -> i64 {
                match self {
                    #(Self::#idents => #discriminants,)*
                }
            }

            fn from_discriminant(value: i64) -> ::std::option::Option<Self> {
                match value {
                    #(#discriminants => ::std::option::Option::Some(Self::#idents),)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::harp_common::value::FromValue for #name {
            fn target_type() -> ::harp_common::target::TargetType {
                ::harp_common::target::TargetType::Enum(
                    <Self as ::harp_common::target::ConvertEnum>::enum_type(),
                )
            }

            fn from_value(
                value: ::harp_common::value::Value<'_>,
            ) -> ::std::result::Result<Self, ::harp_common::error::ConvertError> {
                match value {
                    ::harp_common::value::Value::Enum(e)
                        if e.enum_type().name() == #enum_name =>
                    {
                        <Self as ::harp_common::target::ConvertEnum>::from_discriminant(e.value())
                            .ok_or_else(|| ::harp_common::error::ConvertError::UndefinedEnumValue {
                                enum_name: #enum_name.to_string(),
                                value: e.value(),
                            })
                    }
                    other => ::std::result::Result::Err(::harp_common::value::unexpected(
                        &other,
                        &<Self as ::harp_common::value::FromValue>::target_type(),
                    )),
                }
            }
        }

        impl ::std::convert::From<#name> for ::harp_common::value::Value<'_> {
            fn from(v: #name) -> Self {
                ::harp_common::value::Value::Enum(::harp_common::target::EnumValue::new(
                    <#name as ::harp_common::target::ConvertEnum>::enum_type(),
                    <#name as ::harp_common::target::ConvertEnum>::discriminant(&v),
                ))
            }
        }
    })
}

/// Read `#[convert(<key> = "...")]` from an attribute list.
fn convert_attr(attrs: &[syn::Attribute], key: &str) -> Result<Option<String>, syn::Error> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident("convert") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
                Ok(())
            } else {
                Err(meta.error(format!("unknown convert attribute (expected `{key}`)")))
            }
        })?;
    }
    Ok(found)
}

/// `3` or `-3`; anything else is rejected.
fn literal_discriminant(expr: &Expr) -> Result<i64, syn::Error> {
    match expr {
        Expr::Lit(ExprLit { lit: Lit::Int(int), .. }) => int.base10_parse::<i64>(),
        Expr::Unary(ExprUnary { op: UnOp::Neg(_), expr, .. }) => match expr.as_ref() {
            Expr::Lit(ExprLit { lit: Lit::Int(int), .. }) => {
                int.base10_parse::<i64>().map(|v| -v)
            }
            other => Err(syn::Error::new_spanned(
                other,
                "ConvertEnum discriminants must be integer literals",
            )),
        },
        other => Err(syn::Error::new_spanned(
            other,
            "ConvertEnum discriminants must be integer literals",
        )),
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn expands_members_with_implicit_discriminants() {
        let input: DeriveInput = parse_quote! {
            #[convert(name = "Shade")]
            enum Color {
                Red = -2,
                Green,
                #[convert(rename = "Azure")]
                Blue = 7,
            }
        };
        let tokens: String = derive_impl(&input)
            .unwrap()
            .to_string()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        assert!(tokens.contains(r#""Shade""#));
        assert!(tokens.contains(r#"("Red",-2i64)"#));
        assert!(tokens.contains(r#"("Green",-1i64)"#));
        assert!(tokens.contains(r#"("Azure",7i64)"#));
    }

    #[test]
    fn rejects_unsupported_shapes() {
        let cases: [DeriveInput; 4] = [
            parse_quote! { struct Point { x: i32 } },
            parse_quote! { enum Empty {} },
            parse_quote! { enum Wrapper<T> { One(T) } },
            parse_quote! { enum Shape { Circle(f64) } },
        ];
        for input in &cases {
            assert!(derive_impl(input).is_err(), "{}", input.ident);
        }

        let computed: DeriveInput = parse_quote! { enum Bits { A = 1 << 2 } };
        let err = derive_impl(&computed).unwrap_err();
        assert_eq!(err.to_string(), "ConvertEnum discriminants must be integer literals");
    }
}
