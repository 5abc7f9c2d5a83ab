//--> Imports <--

use std::fmt;

//--> Constants <--

// Register fields, in operand order: bits 11-9, 8-6 and 2-0.
pub const REGISTER_POSITIONS: [u16; 3] = [9, 6, 0];

// JMP, JSRR and JMPT keep their only register in the second field.
pub const BASE_REGISTER_POSITION: u16 = 6;

// ADD/AND: when set, the low five bits are an immediate instead of a register.
pub const IMMEDIATE_FLAG_POSITION: u16 = 5;

pub const NEGATIVE_FLAG: u16 = 1 << 11;
pub const ZERO_FLAG: u16 = 1 << 10;
pub const POSITIVE_FLAG: u16 = 1 << 9;

pub const WORD_WIDTH: u32 = 16;

//--> Structs <--

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Conditions {
	pub negative: bool,
	pub zero: bool,
	pub positive: bool,
}

//--> Enums <--

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Keyword {
	Instruction(Opcode),
	Directive(Dir),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Opcode {
	Add,
	And,
	Branch(Conditions),
	Jump,
	JumpSubroutine,
	JumpSubroutineRegister,
	Load,
	LoadIndirect,
	LoadBaseOffset,
	LoadEffectiveAddress,
	Not,
	Return,
	ReturnInterrupt,
	Store,
	StoreIndirect,
	StoreBaseOffset,
	Trap,
	TrapRoutine(TrapRoutine),
	JumpPrivileged,
	ReturnPrivileged,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TrapRoutine {
	GetCharacter,
	Output,
	PutString,
	Input,
	PutPackedString,
	Halt,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Dir {
	Origin,
	Fill,
	BlockOfWords,
	StringZero,
	End,
}

/// The operand shapes the encoder knows how to validate and pack.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperandClass {
	// ADD/AND: register, register, register or imm5
	RegisterImmediate,
	// JMP/JSRR/JMPT: one register at bits 8-6
	BaseRegister,
	// NOT: destination, source
	RegisterPair,
	// LDR/STR: register, base register, offset6 (never a label)
	BaseOffset,
	// LD/LDI/LEA/ST/STI: register, then a label or numeral
	RegisterPcOffset,
	// BR/JSR: a single label or numeral
	PcOffset,
	// TRAP: an eight bit vector
	TrapVector,
	// RET/RTI/RTT and the trap routine aliases
	NoOperands,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Register {
	R0,
	R1,
	R2,
	R3,
	R4,
	R5,
	R6,
	R7,
}

//--> Functions <--

/// Bit mask covering the low `width` bits of a word.
pub const fn mask(width: u32) -> u16 {
	if width >= WORD_WIDTH { 0xFFFF } else { (1u16 << width) - 1 }
}

impl Keyword {
	/// Looks a mnemonic or directive up, ignoring case. `None` means the word
	/// is not a keyword and may be a label instead.
	pub fn new(s: &str) -> Option<Keyword> {
		let su = s.to_uppercase();

		let keyword = match su.as_str() {
			// directives
			".ORIG" => Keyword::Directive(Dir::Origin),
			".FILL" => Keyword::Directive(Dir::Fill),
			".BLKW" => Keyword::Directive(Dir::BlockOfWords),
			".STRINGZ" => Keyword::Directive(Dir::StringZero),
			".END" => Keyword::Directive(Dir::End),
			// instructions
			"ADD" => Keyword::Instruction(Opcode::Add),
			"AND" => Keyword::Instruction(Opcode::And),
			"JMP" => Keyword::Instruction(Opcode::Jump),
			"JSR" => Keyword::Instruction(Opcode::JumpSubroutine),
			"JSRR" => Keyword::Instruction(Opcode::JumpSubroutineRegister),
			"LD" => Keyword::Instruction(Opcode::Load),
			"LDI" => Keyword::Instruction(Opcode::LoadIndirect),
			"LDR" => Keyword::Instruction(Opcode::LoadBaseOffset),
			"LEA" => Keyword::Instruction(Opcode::LoadEffectiveAddress),
			"NOT" => Keyword::Instruction(Opcode::Not),
			"RET" => Keyword::Instruction(Opcode::Return),
			"RTI" => Keyword::Instruction(Opcode::ReturnInterrupt),
			"ST" => Keyword::Instruction(Opcode::Store),
			"STI" => Keyword::Instruction(Opcode::StoreIndirect),
			"STR" => Keyword::Instruction(Opcode::StoreBaseOffset),
			"TRAP" => Keyword::Instruction(Opcode::Trap),
			"JMPT" => Keyword::Instruction(Opcode::JumpPrivileged),
			"RTT" => Keyword::Instruction(Opcode::ReturnPrivileged),
			// trap routines
			"GETC" => Keyword::Instruction(Opcode::TrapRoutine(TrapRoutine::GetCharacter)),
			"OUT" => Keyword::Instruction(Opcode::TrapRoutine(TrapRoutine::Output)),
			"PUTS" => Keyword::Instruction(Opcode::TrapRoutine(TrapRoutine::PutString)),
			"IN" => Keyword::Instruction(Opcode::TrapRoutine(TrapRoutine::Input)),
			"PUTSP" => Keyword::Instruction(Opcode::TrapRoutine(TrapRoutine::PutPackedString)),
			"HALT" => Keyword::Instruction(Opcode::TrapRoutine(TrapRoutine::Halt)),
			// branches carry their condition flags in the mnemonic
			_ => Keyword::Instruction(Opcode::Branch(Conditions::from_mnemonic(&su)?)),
		};

		Some(keyword)
	}
}

impl Conditions {
	pub const ALL: Conditions = Conditions { negative: true, zero: true, positive: true };

	/// Parses `BR`, `BRn`, `BRzp`, ... (already upper-cased). A bare `BR`
	/// branches unconditionally.
	fn from_mnemonic(su: &str) -> Option<Conditions> {
		let suffix = su.strip_prefix("BR")?;

		if suffix.is_empty() { return Some(Conditions::ALL) }

		let mut conditions = Conditions { negative: false, zero: false, positive: false };

		for c in suffix.chars() {
			let flag = match c {
				'N' => &mut conditions.negative,
				'Z' => &mut conditions.zero,
				'P' => &mut conditions.positive,
				_ => return None,
			};

			// BRnn is a typo, not a branch
			if *flag { return None }
			*flag = true;
		}

		Some(conditions)
	}

	pub const fn bits(&self) -> u16 {
		(if self.negative { NEGATIVE_FLAG } else { 0 })
			| (if self.zero { ZERO_FLAG } else { 0 })
			| (if self.positive { POSITIVE_FLAG } else { 0 })
	}
}

impl Opcode {
	/// The fixed part of the instruction word: opcode bits plus any sub-opcode
	/// or flag bits that don't depend on operands.
	pub const fn bits(&self) -> u16 {
		match self {
			Opcode::Add => 0b0001 << 12,
			Opcode::And => 0b0101 << 12,
			Opcode::Branch(conditions) => conditions.bits(),
			Opcode::Jump => 0b1100 << 12,
			Opcode::JumpSubroutine => 0b01001 << 11,
			Opcode::JumpSubroutineRegister => 0b0100 << 12,
			Opcode::Load => 0b0010 << 12,
			Opcode::LoadIndirect => 0b1010 << 12,
			Opcode::LoadBaseOffset => 0b0110 << 12,
			Opcode::LoadEffectiveAddress => 0b1110 << 12,
			Opcode::Not => (0b1001 << 12) | 0b111111,
			Opcode::Return => 0b1100_000_111_000000,
			Opcode::ReturnInterrupt => 0b1000 << 12,
			Opcode::Store => 0b0011 << 12,
			Opcode::StoreIndirect => 0b1011 << 12,
			Opcode::StoreBaseOffset => 0b0111 << 12,
			Opcode::Trap => 0b1111 << 12,
			Opcode::TrapRoutine(routine) => (0b1111 << 12) | routine.vector(),
			Opcode::JumpPrivileged => (0b1100 << 12) | 1,
			Opcode::ReturnPrivileged => 0b1100_000_111_000001,
		}
	}

	pub const fn class(&self) -> OperandClass {
		match self {
			Opcode::Add | Opcode::And => OperandClass::RegisterImmediate,
			Opcode::Jump | Opcode::JumpSubroutineRegister | Opcode::JumpPrivileged => OperandClass::BaseRegister,
			Opcode::Not => OperandClass::RegisterPair,
			Opcode::LoadBaseOffset | Opcode::StoreBaseOffset => OperandClass::BaseOffset,
			Opcode::Load | Opcode::LoadIndirect | Opcode::LoadEffectiveAddress | Opcode::Store | Opcode::StoreIndirect => OperandClass::RegisterPcOffset,
			Opcode::Branch(_) | Opcode::JumpSubroutine => OperandClass::PcOffset,
			Opcode::Trap => OperandClass::TrapVector,
			Opcode::Return | Opcode::ReturnInterrupt | Opcode::ReturnPrivileged | Opcode::TrapRoutine(_) => OperandClass::NoOperands,
		}
	}

	/// Width of the immediate or offset field, zero when there is none.
	pub const fn immediate_width(&self) -> u32 {
		match self {
			Opcode::Add | Opcode::And => 5,
			Opcode::LoadBaseOffset | Opcode::StoreBaseOffset => 6,
			Opcode::Trap => 8,
			Opcode::Branch(_) | Opcode::Load | Opcode::LoadIndirect | Opcode::LoadEffectiveAddress | Opcode::Store | Opcode::StoreIndirect => 9,
			Opcode::JumpSubroutine => 11,
			_ => 0,
		}
	}

	pub const fn immediate_mask(&self) -> u16 { mask(self.immediate_width()) }
}

impl TrapRoutine {
	pub const fn vector(&self) -> u16 {
		match self {
			TrapRoutine::GetCharacter => 0x20,
			TrapRoutine::Output => 0x21,
			TrapRoutine::PutString => 0x22,
			TrapRoutine::Input => 0x23,
			TrapRoutine::PutPackedString => 0x24,
			TrapRoutine::Halt => 0x25,
		}
	}
}

impl Register {
	pub fn new(s: &str) -> Option<Register> {
		match s.to_uppercase().as_str() {
			"R0" => Some(Register::R0),
			"R1" => Some(Register::R1),
			"R2" => Some(Register::R2),
			"R3" => Some(Register::R3),
			"R4" => Some(Register::R4),
			"R5" => Some(Register::R5),
			"R6" => Some(Register::R6),
			"R7" => Some(Register::R7),
			_ => None,
		}
	}

	pub const fn code(&self) -> u16 { *self as u16 }

	/// The register shifted into operand field `index` (0, 1 or 2).
	pub const fn at(&self, index: usize) -> u16 { self.code() << REGISTER_POSITIONS[index] }
}

impl fmt::Display for Opcode {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Opcode::Add => write!(f, "ADD"),
			Opcode::And => write!(f, "AND"),
			Opcode::Branch(c) => {
				write!(f, "BR")?;
				if c.negative { write!(f, "n")?; }
				if c.zero { write!(f, "z")?; }
				if c.positive { write!(f, "p")?; }
				Ok(())
			},
			Opcode::Jump => write!(f, "JMP"),
			Opcode::JumpSubroutine => write!(f, "JSR"),
			Opcode::JumpSubroutineRegister => write!(f, "JSRR"),
			Opcode::Load => write!(f, "LD"),
			Opcode::LoadIndirect => write!(f, "LDI"),
			Opcode::LoadBaseOffset => write!(f, "LDR"),
			Opcode::LoadEffectiveAddress => write!(f, "LEA"),
			Opcode::Not => write!(f, "NOT"),
			Opcode::Return => write!(f, "RET"),
			Opcode::ReturnInterrupt => write!(f, "RTI"),
			Opcode::Store => write!(f, "ST"),
			Opcode::StoreIndirect => write!(f, "STI"),
			Opcode::StoreBaseOffset => write!(f, "STR"),
			Opcode::Trap => write!(f, "TRAP"),
			Opcode::TrapRoutine(r) => match r {
				TrapRoutine::GetCharacter => write!(f, "GETC"),
				TrapRoutine::Output => write!(f, "OUT"),
				TrapRoutine::PutString => write!(f, "PUTS"),
				TrapRoutine::Input => write!(f, "IN"),
				TrapRoutine::PutPackedString => write!(f, "PUTSP"),
				TrapRoutine::Halt => write!(f, "HALT"),
			},
			Opcode::JumpPrivileged => write!(f, "JMPT"),
			Opcode::ReturnPrivileged => write!(f, "RTT"),
		}
	}
}

impl fmt::Display for Dir {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Dir::Origin => write!(f, ".ORIG"),
			Dir::Fill => write!(f, ".FILL"),
			Dir::BlockOfWords => write!(f, ".BLKW"),
			Dir::StringZero => write!(f, ".STRINGZ"),
			Dir::End => write!(f, ".END"),
		}
	}
}
