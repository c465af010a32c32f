mod scope;

use proc_macro::TokenStream;

#[proc_macro_derive(Scope, attributes(scope))]
pub fn derive_scope(item: TokenStream) -> TokenStream {
    scope::derive_scope(item)
}
