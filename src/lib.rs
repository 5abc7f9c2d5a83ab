//! An assembler for the LC-3, a 16-bit teaching architecture.
//!
//! Source is fed in one line at a time. Each line is tokenized, then either
//! encoded as an instruction or handled as a directive, writing words into a
//! 64K-word memory image. Labels may be used before they are defined; once
//! every line is in, [`Assembler::link`] patches their offsets and
//! [`Assembler::to_bytes`] produces the object file: the origin word followed
//! by the assembled words.
//!
//! ```
//! use lc3asm::{assemble, ByteOrder, Config};
//!
//! let bytes = assemble(".ORIG x3000\nHALT\n.END", &Config::default(), ByteOrder::Big).unwrap();
//! assert_eq!(bytes, vec![0x30, 0x00, 0xF0, 0x25]);
//! ```

//--> Imports <--

// The assembly session: line dispatch, linking and output.
pub mod assembler;

// .ORIG, .FILL, .BLKW, .STRINGZ and .END.
mod directive;

// Operand validation and instruction word packing.
pub mod encode;

// Opcodes, registers, condition flags and their bit layouts.
pub mod encoding;

pub mod error;

// The 64K-word address space and object file output.
pub mod image;

// Splits source lines into tokens.
pub mod lex;

// Label definitions, usages and the link pass.
pub mod symbol;

// Handles strings and characters going into assembly.
pub mod text;

pub use assembler::{
	assemble,
	Assembler,
	Config,
};
pub use error::{
	Error,
	ErrorKind,
	Result,
};
pub use image::{
	ByteOrder,
	MemoryImage,
};
pub use symbol::SymbolTable;
