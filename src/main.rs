//--> Imports <--

use std::{
	fmt,
	fs,
	io::Write,
	path::PathBuf,
	process,
};

use clap::{
	Arg,
	PossibleValue,
	ValueEnum,
};

use log::{
	info,
	LevelFilter,
};

use lc3asm::{
	Assembler,
	ByteOrder,
	Config,
};

//--> Structs <--

struct Diagnostic {
	file: PathBuf,
	line: Option<usize>,
	message: String,
}

//--> Enums <--

#[derive(Clone, Copy, Eq, PartialEq)]
enum Endianness {
	Big,
	Little,
}

//--> Functions <--

fn main() {
	let args = {
		clap::command!()
		.long_about(
			"lc3asm assembles source for the LC-3, a 16-bit architecture used to teach computer organization. \
			The output is an object file holding the load origin followed by the assembled words.\n\n\
			Labels may be used before they are defined. Every error is fatal, and is reported with the line it was found on."
		)
		.arg_required_else_help(true)
		.args([
			{
				Arg::new("verbose")
				.short('v')
				.long("verbose")
				.help("Tells the assembler to output additional information while assembling, rather than just outputting errors.")
			},
			{
				Arg::new("output")
				.short('o')
				.long("out")
				.value_name("OUTPATH")
				.value_parser(clap::value_parser!(PathBuf))
				.help("Specifies a custom path for the object file. By default, it is placed next to the source with the extension 'obj'.")
			},
			{
				Arg::new("listing")
				.short('l')
				.long("list")
				.value_name("LISTPATH")
				.value_parser(clap::value_parser!(PathBuf))
				.help("Specifies a path to generate a listing file at. By default, no listing file is generated.")
			},
			{
				Arg::new("endian")
				.short('e')
				.long("endian")
				.value_name("ORDER")
				.value_parser(clap::value_parser!(Endianness))
				.help("Specifies the byte order of the object file. By default, words are written big-endian.")
			},
			{
				Arg::new("origin")
				.long("origin")
				.value_name("HEX")
				.value_parser(parse_origin)
				.help("Specifies where the program is loaded when the source has no .ORIG. By default, this is x3000.")
			},
			{
				Arg::new("infile")
				.value_name("INPATH")
				.value_parser(clap::value_parser!(PathBuf))
				.required(true)
				.help("Path to the source file. It must exist.")
			}
		])
		.get_matches()
	};

	let verbose = args.contains_id("verbose");

	setup_logging(if verbose { LevelFilter::Debug } else { LevelFilter::Info });

	let input_path = match args.get_one::<PathBuf>("infile") {
		Some(path) => path.clone(),
		None => {
			eprintln!("ERR: No source file was given.");
			process::exit(1);
		},
	};

	let output_path = match args.get_one::<PathBuf>("output") {
		Some(path) => path.clone(),
		None => input_path.with_extension("obj"),
	};

	let listing_path = args.get_one::<PathBuf>("listing").cloned();

	let order = args.get_one::<Endianness>("endian").map(|e| e.byte_order()).unwrap_or_default();

	let mut config = Config::default();
	if let Some(origin) = args.get_one::<u16>("origin") {
		config.default_origin = *origin;
	}

	let source = match fs::read_to_string(&input_path) {
		Ok(source) => source,
		Err(e) => {
			eprintln!("ERR: {}: {}", input_path.display(), e);
			process::exit(1);
		},
	};

	info!("Assembling '{}'...", input_path.display());

	let mut assembler = Assembler::with_config(config);

	let bytes = match assembler.read_source(&source).and_then(|_| assembler.finish(order)) {
		Ok(bytes) => bytes,
		Err(err) => {
			eprintln!("{}", Diagnostic::new(input_path.clone(), err.line, err.to_string()));
			eprintln!("ERR: Failed to assemble '{}'.", input_path.display());
			process::exit(2);
		},
	};

	if let Err(e) = fs::write(&output_path, &bytes) {
		eprintln!("{}", Diagnostic::new(output_path.clone(), None, e.to_string()));
		process::exit(1);
	}

	info!("Successfully assembled {} words. The object file was output at '{}'.", assembler.image().assembled().len(), output_path.display());

	if let Some(path) = listing_path {
		if let Err(e) = fs::write(&path, assembler.listing()) {
			eprintln!("{}", Diagnostic::new(path.clone(), None, e.to_string()));
			process::exit(1);
		}

		info!("The listing file was output at '{}'.", path.display());
	}
}

fn setup_logging(level: LevelFilter) {
	env_logger::Builder::new()
		.filter_level(level)
		.parse_default_env()
		.format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
		.init();
}

/// Reads an address written as `x3000`, `0x3000` or `3000`.
fn parse_origin(s: &str) -> Result<u16, String> {
	let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix('x')).or_else(|| s.strip_prefix('X')).unwrap_or(s);

	u16::from_str_radix(digits, 16).map_err(|_| format!("'{}' is not a 16-bit hexadecimal address", s))
}

impl Diagnostic {
	pub fn new(file: PathBuf, line: Option<usize>, message: String) -> Diagnostic {
		Diagnostic { file, line, message }
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self.line {
			Some(l) => write!(f, "ERR: {}: {}: {}", self.file.display(), l, self.message),
			None => write!(f, "ERR: {}: {}", self.file.display(), self.message),
		}
	}
}

impl Endianness {
	pub fn byte_order(&self) -> ByteOrder {
		match self {
			Endianness::Big => ByteOrder::Big,
			Endianness::Little => ByteOrder::Little,
		}
	}
}

impl ValueEnum for Endianness {
	fn to_possible_value<'a>(&self) -> Option<PossibleValue<'a>> {
		match self {
			Endianness::Big => Some(PossibleValue::new("big")),
			Endianness::Little => Some(PossibleValue::new("little")),
		}
	}

	fn value_variants<'a>() -> &'a [Self] {
		&[
			Endianness::Big,
			Endianness::Little,
		]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_origin() {
		assert_eq!(parse_origin("x3000"), Ok(0x3000));
		assert_eq!(parse_origin("0x4000"), Ok(0x4000));
		assert_eq!(parse_origin("FE00"), Ok(0xFE00));
		assert!(parse_origin("x10000").is_err());
		assert!(parse_origin("#3000").is_err());
	}

	#[test]
	fn test_diagnostic_display() {
		let diagnostic = Diagnostic::new(PathBuf::from("prog.asm"), Some(4), String::from("undefined label: label 'N' is never defined"));
		assert_eq!(diagnostic.to_string(), "ERR: prog.asm: 4: undefined label: label 'N' is never defined");
		assert_eq!(Diagnostic::new(PathBuf::from("out.obj"), None, String::from("denied")).to_string(), "ERR: out.obj: denied");
	}
}
