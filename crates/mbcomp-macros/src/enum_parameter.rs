//! `#[derive(EnumParameter)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Ident, Lit};

struct Choice {
    ident: Ident,
    label: String,
    value: Option<f64>,
    is_default: bool,
}

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(EnumParameter)] can only be used on enums",
        ));
    };

    let mut choices = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "#[derive(EnumParameter)] variants cannot carry fields",
            ));
        }
        choices.push(Choice {
            ident: variant.ident.clone(),
            label: label_attribute(&variant.attrs)?.unwrap_or_else(|| variant.ident.to_string()),
            value: value_attribute(&variant.attrs)?,
            is_default: variant.attrs.iter().any(|a| a.path().is_ident("default")),
        });
    }

    if choices.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(EnumParameter)] needs at least one variant",
        ));
    }

    let mut defaults = choices.iter().enumerate().filter(|(_, c)| c.is_default);
    let default_index = defaults.next().map(|(i, _)| i).unwrap_or(0);
    if defaults.next().is_some() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(EnumParameter)] allows only one #[default] variant",
        ));
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let count = choices.len();
    let idents: Vec<&Ident> = choices.iter().map(|c| &c.ident).collect();
    let indices: Vec<usize> = (0..count).collect();
    let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
    let values: Vec<f64> = choices
        .iter()
        .enumerate()
        .map(|(i, c)| c.value.unwrap_or(i as f64))
        .collect();
    let default_ident = &choices[default_index].ident;

    Ok(quote! {
        impl #impl_generics ::mbcomp_core::parameter_types::EnumParameterValue
            for #name #ty_generics #where_clause
        {
            const COUNT: usize = #count;
            const DEFAULT_INDEX: usize = #default_index;

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #(#indices => ::core::option::Option::Some(#name::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn to_index(self) -> usize {
                match self {
                    #(#name::#idents => #indices,)*
                }
            }

            fn default_value() -> Self {
                #name::#default_ident
            }

            fn name(index: usize) -> &'static str {
                match index {
                    #(#indices => #labels,)*
                    _ => "",
                }
            }

            fn names() -> &'static [&'static str] {
                &[#(#labels),*]
            }

            fn value(self) -> f64 {
                match self {
                    #(#name::#idents => #values,)*
                }
            }
        }
    })
}

/// `#[name = "..."]`
fn label_attribute(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("name")) else {
        return Ok(None);
    };
    match &attr.meta.require_name_value()?.value {
        Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Ok(Some(s.value())),
        other => Err(syn::Error::new_spanned(other, "expected #[name = \"...\"]")),
    }
}

/// `#[value = 1.5]` or `#[value = 2]`
fn value_attribute(attrs: &[Attribute]) -> syn::Result<Option<f64>> {
    let Some(attr) = attrs.iter().find(|a| a.path().is_ident("value")) else {
        return Ok(None);
    };
    match &attr.meta.require_name_value()?.value {
        Expr::Lit(ExprLit { lit: Lit::Float(f), .. }) => f.base10_parse().map(Some),
        Expr::Lit(ExprLit { lit: Lit::Int(i), .. }) => i.base10_parse().map(Some),
        other => Err(syn::Error::new_spanned(other, "expected a number, e.g. #[value = 1.5]")),
    }
}
