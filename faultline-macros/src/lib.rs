extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, parse_quote, ItemFn, ReturnType};

/// #[abort_boundary] - Turn a function into an abort recovery boundary
///
/// The function body runs under `faultline::recover`, and the return type
/// `T` becomes `Result<T, faultline::AbortSignal>`. Aborts raised anywhere
/// inside the body come back as `Err`; other panics keep unwinding.
///
/// Example:
/// ```rust,ignore
/// #[abort_boundary]
/// fn load(path: &str) -> Config {
///     let text = std::fs::read_to_string(path).check().on_failure_abort("read config");
///     parse(&text)
/// }
///
/// match load("app.toml") {
///     Ok(config) => run(config),
///     Err(signal) => eprintln!("{signal}"),
/// }
/// ```
#[proc_macro_attribute]
pub fn abort_boundary(args: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    if !args.is_empty() {
        let args = proc_macro2::TokenStream::from(args);
        return syn::Error::new_spanned(args, "abort_boundary takes no arguments")
            .to_compile_error()
            .into();
    }

    if let Some(asyncness) = &input_fn.sig.asyncness {
        return syn::Error::new_spanned(
            asyncness,
            "abort_boundary cannot wrap an async fn: aborts unwind synchronously",
        )
        .to_compile_error()
        .into();
    }

    if let Some(constness) = &input_fn.sig.constness {
        return syn::Error::new_spanned(constness, "abort_boundary cannot wrap a const fn")
            .to_compile_error()
            .into();
    }

    let attrs = &input_fn.attrs;
    let vis = &input_fn.vis;
    let body = &input_fn.block;

    // Wrap the declared return type
    let mut sig = input_fn.sig.clone();
    let return_type: syn::Type = match &input_fn.sig.output {
        ReturnType::Type(_, ty) => (**ty).clone(),
        ReturnType::Default => parse_quote!(()),
    };
    sig.output = parse_quote! {
        -> ::core::result::Result<#return_type, ::faultline::AbortSignal>
    };

    let expanded = quote! {
        #(#attrs)*
        #vis #sig {
            ::faultline::recover(move || #body)
        }
    };

    TokenStream::from(expanded)
}
