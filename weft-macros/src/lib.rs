mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};
use utils::RuntimeOptions;

/// Awaits every argument future on the calling task and evaluates to a
/// tuple of their outputs, in argument order.
///
/// The branches share the caller's waker. A branch parked on a
/// synchronizer resumes the whole `join!` when it is released, and each
/// wake-up polls only the branches that have not finished yet.
///
/// ```rust,ignore
/// let (a, b) = weft::join!(first(), second());
/// ```
#[proc_macro]
pub fn join(input: TokenStream) -> TokenStream {
    let branches: Vec<String> = utils::split_args(input)
        .iter()
        .map(|tokens| utils::to_source(tokens))
        .collect();

    if branches.is_empty() {
        return utils::parse_source("()");
    }

    let mut source = String::from("{\n");

    for (i, expr) in branches.iter().enumerate() {
        source.push_str(&format!(
            "let mut __weft_future_{i} = ::std::boxed::Box::pin({expr});\n\
             let mut __weft_output_{i} = ::core::option::Option::None;\n"
        ));
    }

    source.push_str("::std::future::poll_fn(|__weft_cx| {\n");
    source.push_str("let mut __weft_pending = false;\n");

    for i in 0..branches.len() {
        source.push_str(&format!(
            "if __weft_output_{i}.is_none() {{\n\
                 match ::std::future::Future::poll(__weft_future_{i}.as_mut(), __weft_cx) {{\n\
                     ::std::task::Poll::Ready(value) => __weft_output_{i} = ::core::option::Option::Some(value),\n\
                     ::std::task::Poll::Pending => __weft_pending = true,\n\
                 }}\n\
             }}\n"
        ));
    }

    source.push_str("if __weft_pending {\nreturn ::std::task::Poll::Pending;\n}\n");
    source.push_str("::std::task::Poll::Ready((");

    for i in 0..branches.len() {
        source.push_str(&format!("__weft_output_{i}.take().unwrap(), "));
    }

    source.push_str("))\n}).await\n}");

    utils::parse_source(&source)
}

/// Runs an `async fn main` on a fresh Weft runtime.
///
/// Takes the runtime options `wrap_io = <bool>` and
/// `event_capacity = <n>`:
///
/// ```rust,ignore
/// #[weft::main(wrap_io = false)]
/// async fn main() {}
/// ```
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    entry(attr, item, false)
}

/// Turns an `async fn` into a `#[test]` driven by a fresh Weft runtime.
///
/// Takes the same runtime options as [`macro@main`]. The test may return
/// whatever a plain `#[test]` may, such as a `Result`.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    entry(attr, item, true)
}

/// Rewrites `async fn f() { body }` into
/// `fn f() { runtime.block_on(async move { body }) }`.
fn entry(attr: TokenStream, item: TokenStream, is_test: bool) -> TokenStream {
    let options = match RuntimeOptions::parse(attr) {
        Ok(options) => options,
        Err(message) => return utils::compile_error(&message),
    };

    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    let Some(async_pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    else {
        return utils::compile_error("weft entry points must be `async fn`");
    };
    tokens.remove(async_pos);

    let Some(TokenTree::Group(body)) = tokens.last_mut() else {
        return utils::compile_error("expected a function body");
    };

    if body.delimiter() != Delimiter::Brace {
        return utils::compile_error("expected a function body");
    }

    let source = format!(
        "{{ {}.block_on(async move {{ {} }}) }}",
        options.builder(),
        body.stream()
    );
    *body = Group::new(Delimiter::Brace, utils::parse_source(&source));

    let mut output = if is_test {
        utils::parse_source("#[::core::prelude::v1::test]")
    } else {
        TokenStream::new()
    };

    output.extend(tokens);
    output
}
