//! Compile-time error reporting.
//!
//! Every macro entry point returns [`MacroResult`] and turns the error into
//! `compile_error!` tokens, so problems show up at the offending span instead
//! of as a panic inside the compiler.

use proc_macro2::Span;
use quote::ToTokens;
use syn::Error;

pub type MacroResult<T> = Result<T, Error>;

/// Create an error at the call site.
#[inline]
pub fn err_call_site<M: std::fmt::Display>(message: M) -> Error {
    Error::new(Span::call_site(), message)
}

/// Create an error spanning `tokens`.
#[inline]
pub fn err_spanned<T: ToTokens, M: std::fmt::Display>(tokens: T, message: M) -> Error {
    Error::new_spanned(tokens, message)
}
