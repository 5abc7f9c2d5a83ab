//--> Imports <--

use crate::error::{
	Error,
	Result,
};

//--> Type Aliases <--

pub type WordString = Vec<u16>;

//--> Functions <--

fn char_to_word(c: char) -> Result<u16> {
	u16::try_from(c as u32).map_err(|_| Error::value_format(format!("character '{}' doesn't fit in a 16-bit word", c)))
}

/// Strips the surrounding quotes of a string operand. Both the first and the
/// last character have to be `"`.
pub fn unquote(token: &str) -> Option<&str> {
	if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
		Some(&token[1..token.len() - 1])
	} else { None }
}

/// Turns the body of a string literal into one word per character, decoding
/// escape sequences along the way.
pub fn make_word_string(s: &str) -> Result<WordString> {
	let mut char_stack = s.chars().rev().collect::<Vec<char>>();
	let mut string: WordString = Vec::with_capacity(char_stack.len());

	while let Some(char0) = char_stack.pop() {
		if char0 != '\\' {
			string.push(char_to_word(char0)?);
			continue;
		}

		let escape = char_stack.pop().ok_or_else(|| Error::value_format(format!("string \"{}\" ends in an incomplete escape sequence", s)))?;

		match escape {
			'0' => string.push(0x00),
			'a' => string.push(0x07),
			'b' => string.push(0x08),
			't' => string.push(0x09),
			'n' => string.push(0x0a),
			'v' => string.push(0x0b),
			'f' => string.push(0x0c),
			'r' => string.push(0x0d),
			'e' => string.push(0x1b),
			'"' => string.push(0x22),
			'\\' => string.push(0x5c),
			'x' => {
				let mut value_string = String::new();

				for _ in 0..2 {
					if let Some(c) = char_stack.pop() { value_string.push(c); }
				}

				match u8::from_str_radix(&value_string, 16) {
					Ok(b) if value_string.len() == 2 && value_string.chars().all(|c| c.is_ascii_hexdigit()) => string.push(b as u16),
					_ => return Err(Error::value_format(format!("'\\x{}' is not a valid byte escape for base 16", value_string))),
				}
			},
			other => return Err(Error::value_format(format!("unrecognized escape sequence '\\{}'", other))),
		}
	}

	Ok(string)
}
