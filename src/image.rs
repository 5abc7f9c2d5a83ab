//--> Imports <--

use log::trace;

use crate::error::{
	Error,
	Result,
};

//--> Constants <--

pub const MEMORY_SIZE: usize = 0x10000;

//--> Structs <--

/// The full 16-bit address space, plus the origin and program counter of the
/// program being assembled into it.
#[derive(Clone, Debug)]
pub struct MemoryImage {
	words: Box<[u16]>,
	origin: u16,
	// One past the highest address is a valid program counter, so it can't be a u16.
	pc: u32,
}

//--> Enums <--

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ByteOrder {
	#[default]
	Big,
	Little,
}

//--> Functions <--

impl ByteOrder {
	pub fn word_bytes(&self, word: u16) -> [u8; 2] {
		match self {
			ByteOrder::Big => word.to_be_bytes(),
			ByteOrder::Little => word.to_le_bytes(),
		}
	}
}

impl MemoryImage {
	pub fn new(origin: u16) -> MemoryImage {
		MemoryImage {
			words: vec![0u16; MEMORY_SIZE].into_boxed_slice(),
			origin,
			pc: origin as u32,
		}
	}

	/// Moves both the origin and the program counter to `origin`.
	pub fn set_origin(&mut self, origin: u16) {
		self.origin = origin;
		self.pc = origin as u32;
	}

	pub fn origin(&self) -> u16 { self.origin }

	pub fn program_counter(&self) -> u32 { self.pc }

	/// The address the next word will land at.
	pub fn address(&self) -> Result<u16> {
		u16::try_from(self.pc).map_err(|_| Error::structural("the program runs past the end of memory at xFFFF"))
	}

	/// Words still free between the program counter and the end of memory.
	pub fn remaining(&self) -> usize { MEMORY_SIZE - self.pc as usize }

	pub fn get(&self, address: u16) -> u16 { self.words[address as usize] }

	/// Writes `word` at the program counter and moves past it.
	pub fn write(&mut self, word: u16) -> Result<()> {
		let address = self.address()?;

		trace!("x{:04X} <- x{:04X}", address, word);

		self.words[address as usize] = word;
		self.pc += 1;
		Ok(())
	}

	/// Skips `count` words without writing them.
	pub fn advance(&mut self, count: usize) -> Result<()> {
		if count > self.remaining() {
			return Err(Error::structural(format!("reserving {} words at x{:04X} runs past the end of memory", count, self.pc)));
		}

		self.pc += count as u32;
		Ok(())
	}

	/// Replaces the bits of the word at `address` selected by `mask` with `value`.
	pub fn patch(&mut self, address: u16, mask: u16, value: u16) {
		let word = &mut self.words[address as usize];
		*word = (*word & !mask) | (value & mask);

		trace!("x{:04X} patched to x{:04X}", address, *word);
	}

	/// The words between the origin and the program counter.
	pub fn assembled(&self) -> &[u16] {
		let start = (self.origin as usize).min(self.pc as usize);
		&self.words[start..self.pc as usize]
	}

	/// The object file: the origin word followed by every assembled word.
	pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(2 * (self.assembled().len() + 1));

		bytes.extend_from_slice(&order.word_bytes(self.origin));
		for word in self.assembled() {
			bytes.extend_from_slice(&order.word_bytes(*word));
		}

		bytes
	}

	/// One `xADDR: bits` line per assembled word.
	pub fn listing(&self) -> String {
		let mut listing = String::new();

		for (offset, word) in self.assembled().iter().enumerate() {
			listing.push_str(&format!("x{:04X}: {:016b}\n", self.origin as usize + offset, word));
		}

		listing
	}
}

impl Default for MemoryImage {
	fn default() -> MemoryImage { MemoryImage::new(0x3000) }
}
