//--> Imports <--

use std::num::IntErrorKind;

use crate::{
	encoding::{
		mask,
		Opcode,
		OperandClass,
		Register,
		BASE_REGISTER_POSITION,
		IMMEDIATE_FLAG_POSITION,
	},
	error::{
		Error,
		Result,
	},
	lex,
};

//--> Structs <--

/// One encoded instruction word, plus the label it still needs if an operand
/// was a (possibly forward) reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Encoded {
	pub word: u16,
	pub reference: Option<Reference>,
}

/// A PC-relative label operand whose offset is patched in at link time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reference {
	pub label: String,
	pub width: u32,
}

//--> Enums <--

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operand<'a> {
	Register(Register),
	Numeral(i32),
	Label(&'a str),
	Other(&'a str),
}

//--> Functions <--

/// Radix of a numeral literal: `x` hex, `#` decimal, `b` binary. A `#` always
/// starts a numeral; `x` and `b` only when the rest is made of digits of that
/// base, so labels like `xor_mask` or `buffer` stay labels.
pub fn numeral_radix(token: &str) -> Option<u32> {
	let mut chars = token.chars();

	let radix = match chars.next()? {
		'#' => return Some(10),
		'x' | 'X' => 16,
		'b' | 'B' => 2,
		_ => return None,
	};

	let digits = chars.as_str();
	let digits = digits.strip_prefix('-').unwrap_or(digits);

	if !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)) { Some(radix) } else { None }
}

pub fn is_numeral(token: &str) -> bool { numeral_radix(token).is_some() }

/// Parses a prefixed numeral literal such as `x3000`, `#-5` or `b0101`.
pub fn parse_numeral(token: &str) -> Result<i32> {
	let radix = numeral_radix(token).ok_or_else(|| Error::value_format(format!(
		"'{}' is not a value: every value has to be prefixed with 'x' for hexadecimal, '#' for decimal or 'b' for binary",
		token
	)))?;

	i32::from_str_radix(&token[1..], radix).map_err(|e| match e.kind() {
		IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::out_of_range(format!("value '{}' doesn't fit in 32 bits", token)),
		_ => Error::value_format(format!("inappropriate value '{}' for base {}", token, radix)),
	})
}

/// Whether `value` fits in a `width`-bit field, read either as two's complement
/// or as an unsigned bit pattern. Only data words take this wider range.
pub fn fits(value: i32, width: u32) -> bool {
	let value = i64::from(value);
	let min = -(1i64 << (width - 1));
	let max = (1i64 << width) - 1;
	min <= value && value <= max
}

/// Whether `value` fits in a `width`-bit two's complement field. Immediates and
/// offsets inside instructions are always signed.
pub fn fits_signed(value: i32, width: u32) -> bool {
	let value = i64::from(value);
	let limit = 1i64 << (width - 1);
	-limit <= value && value < limit
}

/// Label names are letters, digits and underscores, and can't be read as a
/// register or a numeral.
pub fn is_valid_label(s: &str) -> bool {
	!s.is_empty()
		&& s.chars().all(|c| c.is_alphanumeric() || c == '_')
		&& Register::new(s).is_none()
		&& !is_numeral(s)
}

/// Splits the operand tokens of a line on commas, so `R0,R1` and `R0, R1` are
/// the same. Quoted tokens are left whole.
pub fn split_operands(tokens: &[String]) -> Vec<&str> {
	let mut operands = Vec::new();

	for token in tokens {
		if lex::is_quoted(token) {
			operands.push(token.as_str());
		} else {
			operands.extend(token.split(',').filter(|s| !s.is_empty()));
		}
	}

	operands
}

impl<'a> Operand<'a> {
	pub fn new(token: &'a str) -> Result<Operand<'a>> {
		if let Some(register) = Register::new(token) {
			Ok(Operand::Register(register))
		} else if is_numeral(token) {
			Ok(Operand::Numeral(parse_numeral(token)?))
		} else if is_valid_label(token) {
			Ok(Operand::Label(token))
		} else {
			Ok(Operand::Other(token))
		}
	}
}

fn expect_count(opcode: Opcode, operands: &[&str], expected: usize) -> Result<()> {
	if operands.len() == expected {
		Ok(())
	} else {
		Err(Error::operand_count(format!("{} takes {} operand(s), got {}", opcode, expected, operands.len())))
	}
}

fn type_error(opcode: Opcode, position: usize, token: &str, expected: &str) -> Error {
	Error::operand_type(format!("operand {} of {} has to be {}, got '{}'", position + 1, opcode, expected, token))
}

fn register(opcode: Opcode, operands: &[&str], position: usize) -> Result<Register> {
	Register::new(operands[position]).ok_or_else(|| type_error(opcode, position, operands[position], "a register"))
}

fn immediate(opcode: Opcode, token: &str, value: i32, width: u32) -> Result<u16> {
	if fits_signed(value, width) {
		Ok((value as u16) & mask(width))
	} else {
		Err(Error::out_of_range(format!("value '{}' of {} doesn't fit in {} bits", token, opcode, width)))
	}
}

/// Encodes a label-or-numeral operand: numerals land in the word right away,
/// labels come back as a reference to patch later.
fn target(opcode: Opcode, operands: &[&str], position: usize, encoded: &mut Encoded) -> Result<()> {
	let token = operands[position];
	let width = opcode.immediate_width();

	match Operand::new(token)? {
		Operand::Numeral(value) => encoded.word |= immediate(opcode, token, value, width)?,
		Operand::Label(label) => encoded.reference = Some(Reference { label: String::from(label), width }),
		_ => return Err(type_error(opcode, position, token, "a label or a value")),
	}

	Ok(())
}

/// Validates the operands of `opcode` against its operand class and packs them
/// into a complete instruction word.
pub fn encode(opcode: Opcode, operands: &[&str]) -> Result<Encoded> {
	let mut encoded = Encoded { word: opcode.bits(), reference: None };

	match opcode.class() {
		OperandClass::RegisterImmediate => {
			expect_count(opcode, operands, 3)?;

			encoded.word |= register(opcode, operands, 0)?.at(0);
			encoded.word |= register(opcode, operands, 1)?.at(1);

			encoded.word |= match Operand::new(operands[2])? {
				Operand::Register(source) => source.at(2),
				Operand::Numeral(value) => (1 << IMMEDIATE_FLAG_POSITION) | immediate(opcode, operands[2], value, opcode.immediate_width())?,
				_ => return Err(type_error(opcode, 2, operands[2], "a register or an immediate value")),
			};
		},
		OperandClass::BaseRegister => {
			expect_count(opcode, operands, 1)?;

			encoded.word |= register(opcode, operands, 0)?.code() << BASE_REGISTER_POSITION;
		},
		OperandClass::RegisterPair => {
			expect_count(opcode, operands, 2)?;

			encoded.word |= register(opcode, operands, 0)?.at(0);
			encoded.word |= register(opcode, operands, 1)?.at(1);
		},
		OperandClass::BaseOffset => {
			expect_count(opcode, operands, 3)?;

			encoded.word |= register(opcode, operands, 0)?.at(0);
			encoded.word |= register(opcode, operands, 1)?.at(1);

			encoded.word |= match Operand::new(operands[2])? {
				Operand::Numeral(value) => immediate(opcode, operands[2], value, opcode.immediate_width())?,
				_ => return Err(type_error(opcode, 2, operands[2], "an offset value")),
			};
		},
		OperandClass::RegisterPcOffset => {
			expect_count(opcode, operands, 2)?;

			encoded.word |= register(opcode, operands, 0)?.at(0);
			target(opcode, operands, 1, &mut encoded)?;
		},
		OperandClass::PcOffset => {
			expect_count(opcode, operands, 1)?;

			target(opcode, operands, 0, &mut encoded)?;
		},
		OperandClass::TrapVector => {
			expect_count(opcode, operands, 1)?;

			encoded.word |= match Operand::new(operands[0])? {
				Operand::Numeral(value) if (0..=0xFF).contains(&value) => value as u16,
				Operand::Numeral(_) => return Err(Error::out_of_range(format!("trap vector '{}' doesn't fit in 8 bits", operands[0]))),
				_ => return Err(type_error(opcode, 0, operands[0], "a trap vector")),
			};
		},
		OperandClass::NoOperands => expect_count(opcode, operands, 0)?,
	}

	Ok(encoded)
}
