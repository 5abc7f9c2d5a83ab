//--> Imports <--

use logos::Logos;

//--> Type Aliases <--

pub type TokenStream = Vec<String>;

//--> Enums <--

#[derive(Clone, Copy, Debug, Logos, PartialEq)]
enum Tok {
	// An unterminated string runs to the end of the line; .STRINGZ rejects it later.
	#[regex(r#""([^"\\]|\\.)*"?"#)]
	Quoted,

	#[regex(r#"[^ \t\r\n\f";]+"#)]
	Word,

	#[error]
	#[regex(r"[ \t\r\n\f]+", logos::skip)]
	#[regex(r";[^\n]*", logos::skip)]
	Error,
}

//--> Functions <--

/// Splits one source line into tokens. Comments are dropped, whitespace inside
/// a double-quoted string is kept and tabs are removed. Never fails: badly
/// quoted text still comes back as a token for the directive that cares.
pub fn tokenize(line: &str) -> TokenStream {
	let mut tokens: TokenStream = Vec::new();

	for (tok, span) in Tok::lexer(line).spanned() {
		let slice = &line[span];

		match tok {
			Tok::Quoted => tokens.push(slice.replace('\t', "")),
			Tok::Word | Tok::Error => tokens.push(String::from(slice)),
		}
	}

	tokens
}

pub fn is_quoted(token: &str) -> bool { token.starts_with('"') }
