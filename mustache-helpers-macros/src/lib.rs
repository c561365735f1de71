use proc_macro::TokenStream;
use quote::{quote, quote_spanned};
use syn::{Expr, ExprClosure, Pat, ReturnType, parse_macro_input, spanned::Spanned};

/// Turns a typed closure into a `HelperRef`
///
/// The first closure input receives the `&HelperContext`; every other input
/// must be typed with a `FromValue` type, whose parameter type is declared to
/// the engine so arguments arrive already converted.
///
/// ```ignore
/// let multiply = helper!(|_, a: f64, b: f64| a * b);
/// let shout = helper!(|ctx, name: String| format!("{}!", name.to_uppercase()));
/// ```
///
/// The result is converted with `Into<Value>`. If a converted argument does not
/// fit the Rust type (an `i32` overflowing, say) the helper returns null.
#[proc_macro]
pub fn helper(input: TokenStream) -> TokenStream {
    let closure = parse_macro_input!(input as ExprClosure);
    expand(closure)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(closure: ExprClosure) -> syn::Result<proc_macro2::TokenStream> {
    let mut inputs = closure.inputs.iter();
    let context = match inputs.next() {
        Some(Pat::Type(typed)) => {
            let pat = &typed.pat;
            quote! { let #pat = __context; }
        }
        Some(pat) => quote! { let #pat = __context; },
        None => {
            return Err(syn::Error::new(
                closure.span(),
                "helper closures take the helper context as their first input",
            ));
        }
    };

    let mut types = Vec::new();
    let mut bindings = Vec::new();
    for (index, input) in inputs.enumerate() {
        let Pat::Type(typed) = input else {
            return Err(syn::Error::new(
                input.span(),
                "helper arguments need a type, for example `count: i64`",
            ));
        };
        let (pat, ty) = (&typed.pat, &typed.ty);
        types.push(quote_spanned! { ty.span() =>
            <#ty as ::mustache_helpers::FromValue>::TYPE
        });
        bindings.push(quote_spanned! { ty.span() =>
            let #pat: #ty = match __args
                .get(#index)
                .and_then(<#ty as ::mustache_helpers::FromValue>::from_value)
            {
                Some(value) => value,
                None => return ::mustache_helpers::Value::Null,
            };
        });
    }

    let body: &Expr = &closure.body;
    let call = match &closure.output {
        ReturnType::Default => quote! { (|| #body)() },
        ReturnType::Type(_, ty) => quote! { (|| -> #ty { #body })() },
    };

    Ok(quote! {
        ::mustache_helpers::HelperRef::new(
            [#(#types),*],
            move |__context: &::mustache_helpers::HelperContext<'_>,
                  __args: &[::mustache_helpers::Value]|
                  -> ::mustache_helpers::Value {
                #context
                #(#bindings)*
                ::core::convert::Into::<::mustache_helpers::Value>::into(#call)
            },
        )
    })
}
