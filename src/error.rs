//--> Imports <--

use thiserror::Error as ThisError;

//--> Type Aliases <--

pub type Result<T> = std::result::Result<T, Error>;

//--> Structs <--

/// A fatal assembly error. `line` is the 1-based physical source line, filled
/// in by the session once the error leaves `Assembler::read_line`.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{kind}: {message}")]
pub struct Error {
	pub kind: ErrorKind,
	pub line: Option<usize>,
	pub message: String,
}

//--> Enums <--

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, ThisError)]
pub enum ErrorKind {
	// Directive out of place, content after .END, wrong directive arity.
	#[error("structural error")]
	Structural,

	#[error("operand type error")]
	OperandType,

	#[error("operand count error")]
	OperandCount,

	// Bad numeral prefix or digits, bad string escape.
	#[error("value format error")]
	ValueFormat,

	#[error("duplicate label")]
	DuplicateLabel,

	#[error("undefined label")]
	UndefinedLabel,

	// A literal or resolved offset doesn't fit in its bit field.
	#[error("value out of range")]
	OutOfRange,
}

//--> Functions <--

impl Error {
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Error {
		Error { kind, line: None, message: message.into() }
	}

	pub fn structural(message: impl Into<String>) -> Error { Error::new(ErrorKind::Structural, message) }

	pub fn operand_type(message: impl Into<String>) -> Error { Error::new(ErrorKind::OperandType, message) }

	pub fn operand_count(message: impl Into<String>) -> Error { Error::new(ErrorKind::OperandCount, message) }

	pub fn value_format(message: impl Into<String>) -> Error { Error::new(ErrorKind::ValueFormat, message) }

	pub fn out_of_range(message: impl Into<String>) -> Error { Error::new(ErrorKind::OutOfRange, message) }

	/// Attaches a line number unless one is already set.
	pub fn at_line(mut self, line: usize) -> Error {
		if self.line.is_none() { self.line = Some(line); }
		self
	}
}
