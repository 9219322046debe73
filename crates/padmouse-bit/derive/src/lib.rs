mod derive;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Implements `padmouse_bit_mask::Bitable` for a fieldless enum.
///
/// Variants get bits in declaration order, so at most 64 are allowed.
#[proc_macro_derive(Bit)]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
