extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, PatType};

/// Wraps an async service method in a MongoDB transaction.
///
/// The method must take a `session: &mut Session` argument and return a
/// `Result` whose error type converts from `eyre::Error`. The body runs
/// between `start_transaction` and `commit_transaction`; any `Err` aborts
/// the transaction and is returned unchanged.
#[proc_macro_attribute]
pub fn tx(_args: TokenStream, input: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(input as ItemFn);
    let attrs = &input_fn.attrs;
    let vis = &input_fn.vis;
    let body = &input_fn.block;
    let name = &input_fn.sig.ident;
    let args = &input_fn.sig.inputs;
    let ret = &input_fn.sig.output;

    let forwarded: Vec<_> = args
        .iter()
        .map(|arg| match arg {
            FnArg::Typed(PatType { pat, .. }) => quote! { #pat },
            FnArg::Receiver(_) => quote!(self),
        })
        .collect();

    let body_fn = quote::format_ident!("{}_in_tx", name);
    let gen = quote! {
        #(#attrs)*
        async fn #body_fn(#args) #ret {
            #body
        }

        #(#attrs)*
        #vis async fn #name(#args) #ret {
            session
                .start_transaction()
                .await
                .map_err(eyre::Error::from)?;
            match Self::#body_fn(#(#forwarded),*).await {
                Ok(result) => {
                    session
                        .commit_transaction()
                        .await
                        .map_err(eyre::Error::from)?;
                    Ok(result)
                }
                Err(err) => {
                    // keep the business error even when the abort itself fails
                    if let Err(abort_err) = session.abort_transaction().await {
                        log::error!("failed to abort transaction: {:#}", abort_err);
                    }
                    Err(err)
                }
            }
        }
    };

    TokenStream::from(gen)
}
