use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields};

const MAX_VARIANTS: usize = 64;

pub(crate) fn expand(input: &DeriveInput) -> Result<TokenStream, Error> {
    let name = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(Error::new_spanned(name, "Bit can be derived only for enums"));
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(
                variant,
                "Bit supports only fieldless enum variants",
            ));
        }
        variants.push(&variant.ident);
    }
    if variants.len() > MAX_VARIANTS {
        return Err(Error::new_spanned(
            name,
            format!("Bit supports at most {MAX_VARIANTS} variants"),
        ));
    }

    let index_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u32;
        quote! { #name::#v => #idx }
    });

    let all = variants.iter().map(|v| quote! { #name::#v });

    Ok(quote! {
        impl ::padmouse_bit_mask::Bitable for #name {
            const ALL: &'static [Self] = &[#( #all ),*];

            #[inline]
            fn bit(&self) -> u64 {
                1u64 << ::padmouse_bit_mask::Bitable::index(self)
            }

            #[inline]
            fn index(&self) -> u32 {
                match self { #( #index_arms, )* }
            }
        }
    })
}
