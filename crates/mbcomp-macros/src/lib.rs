//! Derive macros for mbcomp.
//!
//! - `#[derive(EnumParameter)]` implements
//!   `mbcomp_core::parameter_types::EnumParameterValue` for a unit-only enum.

use proc_macro::TokenStream;

mod enum_parameter;

/// Derive `EnumParameterValue` for a discrete choice.
///
/// Variant attributes:
///
/// - `#[name = "..."]` - display label (defaults to the variant identifier)
/// - `#[value = 1.5]` - numeric value paired with the variant (defaults to its index)
/// - `#[default]` - default choice (defaults to the first variant)
///
/// ```ignore
/// #[derive(Copy, Clone, PartialEq, Debug, EnumParameter)]
/// pub enum Ratio {
///     #[name = "1.0"]
///     #[value = 1.0]
///     R1,
///     #[default]
///     #[name = "3.0"]
///     #[value = 3.0]
///     R3,
/// }
///
/// assert_eq!(Ratio::default_value().value(), 3.0);
/// ```
#[proc_macro_derive(EnumParameter, attributes(name, value, default))]
pub fn derive_enum_parameter(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    match enum_parameter::expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
