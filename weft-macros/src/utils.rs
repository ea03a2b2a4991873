use proc_macro::{TokenStream, TokenTree};

/// Splits `input` on its top-level commas, dropping empty pieces so a
/// trailing comma is accepted.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let tokens: Vec<TokenTree> = input.into_iter().collect();

    tokens
        .split(|token| matches!(token, TokenTree::Punct(p) if p.as_char() == ','))
        .filter(|arg| !arg.is_empty())
        .map(<[TokenTree]>::to_vec)
        .collect()
}

/// Renders tokens back to source text.
pub(crate) fn to_source(tokens: &[TokenTree]) -> String {
    tokens.iter().cloned().collect::<TokenStream>().to_string()
}

/// Parses generated source, turning a parse failure into a compile error.
pub(crate) fn parse_source(source: &str) -> TokenStream {
    source
        .parse()
        .unwrap_or_else(|err| compile_error(&format!("weft macro produced invalid code: {err}")))
}

pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("::core::compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}

/// Runtime settings accepted by `#[weft::main]` and `#[weft::test]`.
#[derive(Default)]
pub(crate) struct RuntimeOptions {
    wrap_io: Option<bool>,
    event_capacity: Option<usize>,
}

impl RuntimeOptions {
    /// Parses `key = value` pairs separated by commas.
    pub(crate) fn parse(attr: TokenStream) -> Result<Self, String> {
        let mut options = Self::default();

        for arg in split_args(attr) {
            let [TokenTree::Ident(key), TokenTree::Punct(eq), value] = arg.as_slice() else {
                return Err(format!("expected `option = value`, found `{}`", to_source(&arg)));
            };

            if eq.as_char() != '=' {
                return Err(format!("expected `=` after `{key}`"));
            }

            let value = value.to_string();

            match key.to_string().as_str() {
                "wrap_io" => {
                    let enabled = value
                        .parse::<bool>()
                        .map_err(|_| format!("`wrap_io` takes `true` or `false`, found `{value}`"))?;
                    options.wrap_io = Some(enabled);
                }
                "event_capacity" => match value.parse::<usize>() {
                    Ok(n) if n > 0 => options.event_capacity = Some(n),
                    _ => return Err(format!("`event_capacity` takes a positive integer, found `{value}`")),
                },
                other => return Err(format!("unknown runtime option `{other}`")),
            }
        }

        Ok(options)
    }

    /// Source of an expression building the configured runtime.
    pub(crate) fn builder(&self) -> String {
        let mut source = String::from("::weft::RuntimeBuilder::new()");

        if let Some(enabled) = self.wrap_io {
            source.push_str(&format!(".wrap_io({enabled})"));
        }

        if let Some(n) = self.event_capacity {
            source.push_str(&format!(".event_capacity({n})"));
        }

        source.push_str(".build()");
        source
    }
}
