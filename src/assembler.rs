//--> Imports <--

use log::{
	debug,
	info,
};

use crate::{
	encode::{
		encode,
		is_valid_label,
		split_operands,
	},
	encoding::{
		Keyword,
		Opcode,
	},
	error::{
		Error,
		Result,
	},
	image::{
		ByteOrder,
		MemoryImage,
	},
	lex,
	symbol::{
		Mode,
		Relocation,
		SymbolTable,
	},
};

//--> Structs <--

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
	/// Where the program goes when the source has no `.ORIG`.
	pub default_origin: u16,
}

/// One assembly run: feed it lines, then link and take the bytes.
#[derive(Clone, Debug)]
pub struct Assembler {
	config: Config,
	pub(crate) image: MemoryImage,
	pub(crate) symbols: SymbolTable,
	// Content lines seen so far; .ORIG only works while this is zero.
	pub(crate) line_counter: usize,
	line_number: usize,
	pub(crate) ended: bool,
}

//--> Functions <--

impl Default for Config {
	fn default() -> Config { Config { default_origin: 0x3000 } }
}

impl Assembler {
	pub fn new() -> Assembler { Assembler::with_config(Config::default()) }

	pub fn with_config(config: Config) -> Assembler {
		Assembler {
			config,
			image: MemoryImage::new(config.default_origin),
			symbols: SymbolTable::new(),
			line_counter: 0,
			line_number: 0,
			ended: false,
		}
	}

	pub fn config(&self) -> &Config { &self.config }

	pub fn image(&self) -> &MemoryImage { &self.image }

	pub fn symbols(&self) -> &SymbolTable { &self.symbols }

	pub fn origin(&self) -> u16 { self.image.origin() }

	pub fn program_counter(&self) -> u32 { self.image.program_counter() }

	pub fn line_number(&self) -> usize { self.line_number }

	pub fn is_ended(&self) -> bool { self.ended }

	/// Assembles one source line. Errors carry the line's number.
	pub fn read_line(&mut self, line: &str) -> Result<()> {
		self.line_number += 1;
		let line_number = self.line_number;

		self.process_line(line).map_err(|e| e.at_line(line_number))
	}

	/// Assembles every line of `source`, stopping at the first error.
	pub fn read_source(&mut self, source: &str) -> Result<()> {
		for line in source.lines() {
			self.read_line(line)?;
		}

		Ok(())
	}

	fn process_line(&mut self, line: &str) -> Result<()> {
		let tokens = lex::tokenize(line);

		if tokens.is_empty() { return Ok(()) }

		debug!("line {}: {:?}", self.line_number, tokens);

		if self.ended {
			return Err(Error::structural("nothing may follow .END"));
		}
		if self.symbols.is_linked() {
			return Err(Error::structural("the program is already linked"));
		}

		let (label, rest) = match Keyword::new(&tokens[0]) {
			Some(_) => (None, &tokens[..]),
			None => (Some(label_definition(&tokens[0])?), &tokens[1..]),
		};

		let result = match rest.split_first() {
			None => match label {
				Some(label) => self.image.address().and_then(|address| self.symbols.define(label, address)),
				None => Ok(()),
			},
			Some((head, operands)) => match Keyword::new(head) {
				Some(Keyword::Instruction(opcode)) => self.process_instruction(label, opcode, operands),
				Some(Keyword::Directive(dir)) => self.process_directive(label, dir, operands),
				None => Err(Error::structural(format!("'{}' is not an instruction or a directive", head))),
			},
		};

		self.line_counter += 1;
		result
	}

	fn process_instruction(&mut self, label: Option<&str>, opcode: Opcode, tokens: &[String]) -> Result<()> {
		let address = self.image.address()?;
		let encoded = encode(opcode, &split_operands(tokens))?;

		if let Some(label) = label {
			self.symbols.define(label, address)?;
		}

		if let Some(reference) = encoded.reference {
			let relocation = Relocation::new(address, reference.width, Mode::PcRelative, Some(self.line_number));
			self.symbols.record_usage(&reference.label, relocation);
		}

		self.image.write(encoded.word)
	}

	/// Resolves every label usage. Only the first call succeeds.
	pub fn link(&mut self) -> Result<()> {
		info!("linking {} words at x{:04X}", self.image.assembled().len(), self.image.origin());
		self.symbols.link(&mut self.image)
	}

	/// The object file bytes as they stand; doesn't link.
	pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> { self.image.to_bytes(order) }

	/// Links and then serializes.
	pub fn finish(&mut self, order: ByteOrder) -> Result<Vec<u8>> {
		if !self.symbols.is_linked() {
			self.link()?;
		}

		Ok(self.to_bytes(order))
	}

	/// The assembled words followed by the symbol table.
	pub fn listing(&self) -> String {
		let mut listing = self.image.listing();

		for (name, address) in self.symbols.definitions() {
			listing.push_str(&format!("{}: x{:04X}\n", name, address));
		}

		listing
	}
}

impl Default for Assembler {
	fn default() -> Assembler { Assembler::new() }
}

/// Checks the first token of a line as a label definition, dropping a
/// trailing `:`.
fn label_definition(token: &str) -> Result<&str> {
	let name = token.strip_suffix(':').unwrap_or(token);

	if is_valid_label(name) && Keyword::new(name).is_none() {
		Ok(name)
	} else {
		Err(Error::structural(format!("'{}' is neither an instruction, a directive nor a valid label", token)))
	}
}

/// Assembles a whole source text into an object file.
pub fn assemble(source: &str, config: &Config, order: ByteOrder) -> Result<Vec<u8>> {
	let mut assembler = Assembler::with_config(*config);

	assembler.read_source(source)?;
	assembler.finish(order)
}
