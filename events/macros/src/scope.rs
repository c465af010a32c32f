use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input, parse_quote};

pub fn derive_scope(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let struct_name = &ast.ident;

    // Scope: Any, so every type parameter must be 'static.
    let mut generics = ast.generics.clone();
    let params: Vec<_> = generics.type_params().map(|param| param.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for ident in params {
        where_clause.predicates.push(parse_quote!(#ident: 'static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Struct name unless overridden with #[scope(class_name = "...")] or #[scope(anonymous)].
    let mut class_name = Some(struct_name.to_string());
    for attr in ast.attrs.iter().filter(|a| a.path().is_ident("scope")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("class_name") {
                let value: LitStr = meta.value()?.parse()?;
                class_name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("anonymous") {
                class_name = None;
                Ok(())
            } else {
                Err(meta.error("expected `class_name = \"...\"` or `anonymous`"))
            }
        });
        if let Err(err) = parsed {
            return err.to_compile_error().into();
        }
    }

    let body = match class_name {
        Some(name) => quote! {
            fn class_name(&self) -> ::core::option::Option<&str> {
                ::core::option::Option::Some(#name)
            }
        },
        None => quote! {},
    };

    // ::rusty_events resolves inside the crate through `extern crate self as rusty_events;`.
    TokenStream::from(quote! {
        impl #impl_generics ::rusty_events::Scope for #struct_name #ty_generics #where_clause {
            #body
        }
    })
}
