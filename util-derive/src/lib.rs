use proc_macro::TokenStream;
use quote::quote;

/// Derives [`EnumFromStr`](../util/trait.EnumFromStr.html) for a fieldless
/// enum.
///
/// Matching is case-insensitive: the input is uppercased and compared
/// against the uppercased variant names. That is the rule the program
/// format uses for opcode mnemonics, so `Opcode` parses `move`, `Move`
/// and `MOVE` alike. Vocabularies with case-sensitive tokens (frame
/// prefixes, type names) implement the trait by hand instead.
///
/// A standard `FromStr` impl delegating to the trait is generated as
/// well, so the enum works with `str::parse`.
#[proc_macro_derive(EnumFromStr)]
pub fn enum_from_str_derive(input: TokenStream) -> TokenStream {
    let item: syn::DeriveInput = syn::parse(input).unwrap();
    let name = &item.ident;

    let variants: Vec<&syn::Ident> = match &item.data {
        syn::Data::Enum(data) => data
            .variants
            .iter()
            .map(|variant| {
                assert!(
                    variant.fields.is_empty(),
                    "EnumFromStr only supports fieldless variants."
                );
                &variant.ident
            })
            .collect(),
        _ => panic!("EnumFromStr can only be derived for enums."),
    };

    let spellings: Vec<String> = variants
        .iter()
        .map(|ident| ident.to_string().to_uppercase())
        .collect();
    let noun = name.to_string().to_lowercase();

    let expanded = quote! {
        impl EnumFromStr for #name {
            fn from_str(s: &str) -> Result<#name, ::util::ParseEnumError> {
                match s.to_uppercase().as_str() {
                    #( #spellings => Ok(#name::#variants), )*
                    _ => Err(::util::ParseEnumError::new(s, #noun)),
                }
            }
        }

        impl ::core::str::FromStr for #name {
            type Err = ::util::ParseEnumError;

            fn from_str(s: &str) -> Result<#name, ::util::ParseEnumError> {
                EnumFromStr::from_str(s)
            }
        }
    };

    expanded.into()
}
