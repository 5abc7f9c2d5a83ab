//! Whole-program tests through the public API: line dispatch, linking and
//! the object file layout.

use lc3asm::{
	assemble,
	Assembler,
	ByteOrder,
	Config,
	ErrorKind,
};

fn words(bytes: &[u8]) -> Vec<u16> {
	bytes.chunks(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect()
}

// =============================================================================
// Object file layout
// =============================================================================

#[test]
fn test_origin_only_program() {
	let bytes = assemble(".ORIG x3000", &Config::default(), ByteOrder::Big).unwrap();
	assert_eq!(bytes, vec![0x30, 0x00]);
}

#[test]
fn test_empty_source_uses_default_origin() {
	let bytes = assemble("", &Config::default(), ByteOrder::Big).unwrap();
	assert_eq!(bytes, vec![0x30, 0x00]);

	let bytes = assemble("; nothing here\n", &Config { default_origin: 0x0200 }, ByteOrder::Big).unwrap();
	assert_eq!(bytes, vec![0x02, 0x00]);
}

#[test]
fn test_little_endian_output() {
	let bytes = assemble(".ORIG x3000\nADD R0,R1,R2", &Config::default(), ByteOrder::Little).unwrap();
	assert_eq!(bytes, vec![0x00, 0x30, 0x42, 0x10]);
}

#[test]
fn test_to_bytes_does_not_change_the_image() {
	let mut assembler = Assembler::new();
	assembler.read_source(".ORIG x3000\nHALT\n.FILL xBEEF").unwrap();
	assembler.link().unwrap();

	let first = assembler.to_bytes(ByteOrder::Big);
	let little = assembler.to_bytes(ByteOrder::Little);
	let second = assembler.to_bytes(ByteOrder::Big);

	assert_eq!(first, second);
	assert_eq!(words(&first), vec![0x3000, 0xF025, 0xBEEF]);
	assert_eq!(little, vec![0x00, 0x30, 0x25, 0xF0, 0xEF, 0xBE]);
}

// =============================================================================
// Label resolution
// =============================================================================

#[test]
fn test_forward_load() {
	let source = "
		.ORIG x3000
		LD R1, N
		HALT
		N .FILL x5
		.END
	";

	let bytes = assemble(source, &Config::default(), ByteOrder::Big).unwrap();
	assert_eq!(words(&bytes), vec![0x3000, 0x2201, 0xF025, 0x0005]);
}

#[test]
fn test_countdown_loop() {
	let source = "
		.ORIG x3000
		      LD   R0, COUNT     ; R0 = 5
		LOOP  ADD  R0, R0, #-1
		      BRp  LOOP
		      ST   R0, RESULT
		      HALT
		COUNT  .FILL #5
		RESULT .BLKW #1
		.END
	";

	let mut assembler = Assembler::new();
	assembler.read_source(source).unwrap();
	assembler.link().unwrap();

	assert_eq!(assembler.symbols().lookup("LOOP"), Some(0x3001));
	assert_eq!(assembler.symbols().lookup("COUNT"), Some(0x3005));
	assert_eq!(assembler.symbols().lookup("RESULT"), Some(0x3006));
	assert_eq!(assembler.image().assembled(), &[
		0x2004, // LD R0, COUNT
		0x103F, // ADD R0, R0, #-1
		0x03FE, // BRp LOOP
		0x3002, // ST R0, RESULT
		0xF025, // HALT
		0x0005, // COUNT
		0x0000, // RESULT
	]);
}

#[test]
fn test_hello_world() {
	let source = r#"
		.ORIG x3000
		LEA R0, MSG
		PUTS
		HALT
		MSG .STRINGZ "Hi!\n"
		.END
	"#;

	let bytes = assemble(source, &Config::default(), ByteOrder::Big).unwrap();
	assert_eq!(words(&bytes), vec![0x3000, 0xE002, 0xF022, 0xF025, 0x48, 0x69, 0x21, 0x0A, 0x00]);
}

#[test]
fn test_subroutine_call() {
	let source = "
		.ORIG x3000
		JSR DOUBLE
		HALT
		DOUBLE: ADD R0, R0, R0
		RET
	";

	let bytes = assemble(source, &Config::default(), ByteOrder::Big).unwrap();
	assert_eq!(words(&bytes), vec![0x3000, 0x4801, 0xF025, 0x1000, 0xC1C0]);
}

#[test]
fn test_many_usages_of_one_label() {
	let source = "
		.ORIG x3000
		BR END
		BRz END
		LDI R2, END
		END RET
	";

	let mut assembler = Assembler::new();
	assembler.read_source(source).unwrap();
	assert_eq!(assembler.symbols().usages("END").len(), 3);

	assembler.link().unwrap();
	assert_eq!(assembler.image().assembled(), &[0x0E02, 0x0401, 0xA400, 0xC1C0]);
}

#[test]
fn test_mnemonics_ignore_case() {
	let upper = assemble("ADD R0, R1, R2\nBRNZP #0\nHALT", &Config::default(), ByteOrder::Big).unwrap();
	let lower = assemble("add r0, r1, r2\nbrnzp #0\nhalt", &Config::default(), ByteOrder::Big).unwrap();
	assert_eq!(upper, lower);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_undefined_label() {
	let err = assemble(".ORIG x3000\nHALT\nBR NOWHERE", &Config::default(), ByteOrder::Big).unwrap_err();
	assert_eq!(err.kind, ErrorKind::UndefinedLabel);
	assert_eq!(err.line, Some(3));
}

#[test]
fn test_duplicate_label() {
	let err = assemble("A HALT\nA HALT", &Config::default(), ByteOrder::Big).unwrap_err();
	assert_eq!(err.kind, ErrorKind::DuplicateLabel);
	assert_eq!(err.line, Some(2));
}

#[test]
fn test_branch_too_far() {
	let source = ".ORIG x3000\nBR FAR\n.BLKW #300\nFAR HALT";
	let err = assemble(source, &Config::default(), ByteOrder::Big).unwrap_err();
	assert_eq!(err.kind, ErrorKind::OutOfRange);
	assert_eq!(err.line, Some(2));
}

#[test]
fn test_content_after_end() {
	let mut assembler = Assembler::new();
	let err = assembler.read_source(".ORIG x3000\nHALT\n.END\nHALT").unwrap_err();

	assert_eq!(err.kind, ErrorKind::Structural);
	assert_eq!(err.line, Some(4));
	assert_eq!(assembler.image().assembled(), &[0xF025]);
}

#[test]
fn test_error_display() {
	let err = assemble("ADD R0, R1", &Config::default(), ByteOrder::Big).unwrap_err();
	assert_eq!(err.to_string(), "operand count error: ADD takes 3 operand(s), got 2");
}
