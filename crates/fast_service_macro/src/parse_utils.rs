//! Parsing helpers for macro arguments.

use syn::{Ident, Token, parse::ParseStream};

/// Parse a comma-separated list with optional trailing comma.
pub fn parse_comma_list<T, F>(input: ParseStream, mut parser: F) -> syn::Result<Vec<T>>
where
    F: FnMut(ParseStream) -> syn::Result<T>,
{
    let mut items = Vec::new();

    while !input.is_empty() {
        items.push(parser(input)?);

        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        } else {
            break;
        }
    }

    Ok(items)
}

/// Parse a bracket-delimited comma-separated list: `["a", "b"]`.
pub fn parse_bracketed_list<T, F>(input: ParseStream, parser: F) -> syn::Result<Vec<T>>
where
    F: FnMut(ParseStream) -> syn::Result<T>,
{
    let content;
    syn::bracketed!(content in input);
    let items = parse_comma_list(&content, parser)?;
    if !content.is_empty() {
        return Err(content.error("expected `,` or `]`"));
    }
    Ok(items)
}

/// Parse `key = value, ...` pairs.
///
/// The handler receives each key and is responsible for consuming the `=`
/// token and the value.
pub fn parse_key_value_list<F>(input: ParseStream, mut handler: F) -> syn::Result<()>
where
    F: FnMut(Ident, ParseStream) -> syn::Result<()>,
{
    while !input.is_empty() {
        let lookahead = input.lookahead1();

        if lookahead.peek(Ident) {
            let key: Ident = input.parse()?;
            handler(key, input)?;

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            } else if !input.is_empty() {
                return Err(input.error("expected `,` between arguments"));
            }
        } else {
            return Err(lookahead.error());
        }
    }

    Ok(())
}
