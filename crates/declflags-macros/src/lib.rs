mod ast;
mod emit;
mod parse;

#[proc_macro_derive(Args, attributes(args, arg))]
pub fn derive_args(_ts: proc_macro::TokenStream) -> proc_macro::TokenStream {
    // Stub out the code, but let rust-analyzer resolve the invocation
    #[cfg(not(test))]
    {
        let text = match parse::args(_ts) {
            Ok(args) => emit::emit(&args),
            Err(err) => format!("compile_error!({:?});", format!("invalid `Args` derive, {err}")),
        };
        text.parse().unwrap()
    }
    #[cfg(test)]
    unimplemented!()
}

#[cfg(test)]
pub fn compile(src: &str) -> String {
    use proc_macro2::TokenStream;

    let ts = src.parse::<TokenStream>().unwrap();
    let args = parse::args(ts).unwrap();
    emit::emit(&args)
}
