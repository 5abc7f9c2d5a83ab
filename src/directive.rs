//--> Imports <--

use log::debug;

use crate::{
	assembler::Assembler,
	encode::{
		fits,
		parse_numeral,
		split_operands,
		Operand,
	},
	encoding::{
		Dir,
		WORD_WIDTH,
	},
	error::{
		Error,
		Result,
	},
	symbol::{
		Mode,
		Relocation,
	},
	text,
};

//--> Functions <--

fn expect_arity(dir: Dir, operands: &[&str], expected: usize) -> Result<()> {
	if operands.len() == expected {
		Ok(())
	} else {
		Err(Error::structural(format!("{} takes {} operand(s), got {}", dir, expected, operands.len())))
	}
}

fn refuse_label(dir: Dir, label: Option<&str>) -> Result<()> {
	match label {
		Some(label) => Err(Error::structural(format!("{} can't be labeled, found '{}'", dir, label))),
		None => Ok(()),
	}
}

impl Assembler {
	pub(crate) fn process_directive(&mut self, label: Option<&str>, dir: Dir, tokens: &[String]) -> Result<()> {
		match dir {
			Dir::Origin => self.origin_directive(label, tokens),
			Dir::Fill => self.fill_directive(label, tokens),
			Dir::BlockOfWords => self.block_directive(label, tokens),
			Dir::StringZero => self.string_directive(label, tokens),
			Dir::End => self.end_directive(label, tokens),
		}
	}

	fn define_here(&mut self, label: Option<&str>) -> Result<u16> {
		let address = self.image.address()?;

		if let Some(label) = label {
			self.symbols.define(label, address)?;
		}

		Ok(address)
	}

	fn origin_directive(&mut self, label: Option<&str>, tokens: &[String]) -> Result<()> {
		if self.line_counter != 0 {
			return Err(Error::structural(".ORIG has to come before anything else"));
		}
		refuse_label(Dir::Origin, label)?;

		let operands = split_operands(tokens);
		expect_arity(Dir::Origin, &operands, 1)?;

		let token = operands[0];
		if !(token.starts_with('x') || token.starts_with('X')) {
			return Err(Error::value_format(format!("the origin has to be hexadecimal, got '{}'", token)));
		}

		let origin = u16::try_from(parse_numeral(token)?).map_err(|_| Error::out_of_range(format!("origin '{}' is not an address", token)))?;

		debug!("origin x{:04X}", origin);
		self.image.set_origin(origin);
		Ok(())
	}

	fn fill_directive(&mut self, label: Option<&str>, tokens: &[String]) -> Result<()> {
		let operands = split_operands(tokens);
		expect_arity(Dir::Fill, &operands, 1)?;

		let token = operands[0];
		let operand = Operand::new(token)?;
		let word = match operand {
			Operand::Numeral(value) if fits(value, WORD_WIDTH) => value as u16,
			Operand::Numeral(_) => return Err(Error::out_of_range(format!("'{}' doesn't fit in a word", token))),
			Operand::Label(_) => 0,
			_ => return Err(Error::operand_type(format!(".FILL takes a value or a label, got '{}'", token))),
		};

		let address = self.define_here(label)?;

		if let Operand::Label(name) = operand {
			self.symbols.record_usage(name, Relocation::new(address, WORD_WIDTH, Mode::Absolute, Some(self.line_number())));
		}

		self.image.write(word)
	}

	fn block_directive(&mut self, label: Option<&str>, tokens: &[String]) -> Result<()> {
		let operands = split_operands(tokens);
		expect_arity(Dir::BlockOfWords, &operands, 1)?;

		let token = operands[0];
		let count = match Operand::new(token)? {
			Operand::Numeral(count) => usize::try_from(count).map_err(|_| Error::out_of_range(format!("can't reserve '{}' words", token)))?,
			_ => return Err(Error::operand_type(format!(".BLKW takes a word count, got '{}'", token))),
		};

		self.define_here(label)?;
		self.image.advance(count)
	}

	fn string_directive(&mut self, label: Option<&str>, tokens: &[String]) -> Result<()> {
		if tokens.len() != 1 {
			return Err(Error::structural(format!(".STRINGZ takes one quoted string, got {} operand(s)", tokens.len())));
		}

		let body = text::unquote(&tokens[0]).ok_or_else(|| Error::structural(format!(".STRINGZ takes a quoted string, got {}", tokens[0])))?;
		let words = text::make_word_string(body)?;

		if words.len() + 1 > self.image.remaining() {
			return Err(Error::structural(format!("a {} word string at x{:04X} runs past the end of memory", words.len() + 1, self.image.program_counter())));
		}

		self.define_here(label)?;

		for word in words {
			self.image.write(word)?;
		}
		self.image.write(0)
	}

	fn end_directive(&mut self, label: Option<&str>, tokens: &[String]) -> Result<()> {
		refuse_label(Dir::End, label)?;
		expect_arity(Dir::End, &split_operands(tokens), 0)?;

		debug!("end of program at x{:04X}", self.image.program_counter());
		self.ended = true;
		Ok(())
	}
}
