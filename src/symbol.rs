//--> Imports <--

use log::{
	debug,
	trace,
};

use std::collections::{
	BTreeMap,
	HashMap,
};

use crate::{
	encoding::mask,
	error::{
		Error,
		ErrorKind,
		Result,
	},
	image::MemoryImage,
};

//--> Structs <--

/// A word that needs a label's value patched into some of its bits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Relocation {
	pub address: u16,
	pub mask: u16,
	pub width: u32,
	pub mode: Mode,
	pub line: Option<usize>,
}

/// Label definitions and the usages waiting on them.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
	definitions: HashMap<String, u16>,
	usages: BTreeMap<String, Vec<Relocation>>,
	linked: bool,
}

//--> Enums <--

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
	/// Offset from the word after the referencing one.
	PcRelative,
	/// The label's address itself.
	Absolute,
}

//--> Functions <--

impl Relocation {
	pub fn new(address: u16, width: u32, mode: Mode, line: Option<usize>) -> Relocation {
		Relocation { address, mask: mask(width), width, mode, line }
	}

	/// The value to patch in for a label defined at `definition`.
	fn resolve(&self, name: &str, definition: u16) -> Result<u16> {
		match self.mode {
			Mode::Absolute => Ok(definition),
			Mode::PcRelative => {
				let offset = definition as i32 - self.address as i32 - 1;
				let limit = 1i32 << (self.width - 1);

				if offset < -limit || offset >= limit {
					let err = Error::out_of_range(format!(
						"'{}' is {} words away from x{:04X}, more than a {}-bit offset can reach",
						name, offset, self.address, self.width
					));
					return Err(match self.line {
						Some(line) => err.at_line(line),
						None => err,
					});
				}

				Ok(offset as u16)
			},
		}
	}
}

impl SymbolTable {
	pub fn new() -> SymbolTable { SymbolTable::default() }

	/// Binds `name` to `address`. A name can only be defined once.
	pub fn define(&mut self, name: &str, address: u16) -> Result<()> {
		if let Some(existing) = self.definitions.get(name) {
			return Err(Error::new(ErrorKind::DuplicateLabel, format!("label '{}' is already defined at x{:04X}", name, existing)));
		}

		debug!("label {} = x{:04X}", name, address);
		self.definitions.insert(String::from(name), address);
		Ok(())
	}

	/// Notes that the word described by `relocation` needs `name`'s value.
	/// Whether `name` exists is only checked when linking.
	pub fn record_usage(&mut self, name: &str, relocation: Relocation) {
		trace!("usage of {} at x{:04X}", name, relocation.address);
		self.usages.entry(String::from(name)).or_default().push(relocation);
	}

	pub fn lookup(&self, name: &str) -> Option<u16> { self.definitions.get(name).copied() }

	/// Every definition, ordered by address.
	pub fn definitions(&self) -> Vec<(&str, u16)> {
		let mut definitions = self.definitions.iter().map(|(name, address)| (name.as_str(), *address)).collect::<Vec<_>>();
		definitions.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
		definitions
	}

	pub fn usages(&self, name: &str) -> &[Relocation] {
		self.usages.get(name).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn is_linked(&self) -> bool { self.linked }

	/// Patches every recorded usage into `image`. Can only run once.
	pub fn link(&mut self, image: &mut MemoryImage) -> Result<()> {
		if self.linked {
			return Err(Error::structural("the symbol table is already linked"));
		}

		// Source order, so the error we stop at is the earliest one.
		let mut pending = self.usages.iter()
			.flat_map(|(name, relocations)| relocations.iter().map(move |r| (name.as_str(), r)))
			.collect::<Vec<_>>();
		pending.sort_by_key(|(_, r)| (r.line.unwrap_or(usize::MAX), r.address));

		let mut patches = Vec::with_capacity(pending.len());

		for (name, relocation) in pending {
			let definition = match self.definitions.get(name) {
				Some(definition) => *definition,
				None => {
					let err = Error::new(ErrorKind::UndefinedLabel, format!("label '{}' is never defined", name));
					return Err(match relocation.line {
						Some(line) => err.at_line(line),
						None => err,
					});
				},
			};

			patches.push((relocation, relocation.resolve(name, definition)?));
		}

		for (relocation, value) in patches {
			image.patch(relocation.address, relocation.mask, value);
		}

		self.linked = true;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_define_and_lookup() {
		let mut table = SymbolTable::new();

		assert!(table.define("START", 0x3000).is_ok());
		assert!(table.define("LOOP", 0x3010).is_ok());

		assert_eq!(table.lookup("START"), Some(0x3000));
		assert_eq!(table.lookup("LOOP"), Some(0x3010));
		assert_eq!(table.lookup("UNDEFINED"), None);
	}

	#[test]
	fn test_duplicate_definition() {
		let mut table = SymbolTable::new();

		assert!(table.define("START", 0x3000).is_ok());
		let err = table.define("START", 0x4000).unwrap_err();
		assert_eq!(err.kind, ErrorKind::DuplicateLabel);

		// Original definition should still be there
		assert_eq!(table.lookup("START"), Some(0x3000));
	}

	#[test]
	fn test_definitions_sorted_by_address() {
		let mut table = SymbolTable::new();
		table.define("Z", 0x3000).unwrap();
		table.define("A", 0x3005).unwrap();
		table.define("M", 0x3001).unwrap();

		assert_eq!(table.definitions(), vec![("Z", 0x3000), ("M", 0x3001), ("A", 0x3005)]);
	}

	#[test]
	fn test_forward_reference_is_patched() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		// LD R1, N ; HALT ; N .FILL #5
		image.write(0x2200).unwrap();
		table.record_usage("N", Relocation::new(0x3000, 9, Mode::PcRelative, Some(2)));
		image.write(0xF025).unwrap();
		table.define("N", 0x3002).unwrap();
		image.write(5).unwrap();

		table.link(&mut image).unwrap();
		assert_eq!(image.get(0x3000), 0x2201);
		assert_eq!(table.usages("N").len(), 1);
	}

	#[test]
	fn test_backward_reference_is_negative() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		table.define("LOOP", 0x3000).unwrap();
		image.write(0x1021).unwrap();
		image.write(0x0E00).unwrap();
		table.record_usage("LOOP", Relocation::new(0x3001, 9, Mode::PcRelative, None));

		table.link(&mut image).unwrap();
		assert_eq!(image.get(0x3001), 0x0FFE);
	}

	#[test]
	fn test_absolute_usage() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		image.write(0).unwrap();
		table.record_usage("DATA", Relocation::new(0x3000, 16, Mode::Absolute, None));
		table.define("DATA", 0x4321).unwrap();

		table.link(&mut image).unwrap();
		assert_eq!(image.get(0x3000), 0x4321);
	}

	#[test]
	fn test_undefined_label_reports_first_usage_line() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		table.record_usage("NOWHERE", Relocation::new(0x3000, 9, Mode::PcRelative, Some(4)));
		table.record_usage("NOWHERE", Relocation::new(0x3001, 9, Mode::PcRelative, Some(7)));

		let err = table.link(&mut image).unwrap_err();
		assert_eq!(err.kind, ErrorKind::UndefinedLabel);
		assert_eq!(err.line, Some(4));
		assert!(err.message.contains("NOWHERE"));
	}

	#[test]
	fn test_undefined_label_reported_in_source_order() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		table.record_usage("ZETA", Relocation::new(0x3000, 9, Mode::PcRelative, Some(2)));
		table.record_usage("ALPHA", Relocation::new(0x3001, 9, Mode::PcRelative, Some(5)));

		let err = table.link(&mut image).unwrap_err();
		assert_eq!(err.kind, ErrorKind::UndefinedLabel);
		assert_eq!(err.line, Some(2));
		assert!(err.message.contains("ZETA"));
	}

	#[test]
	fn test_failed_link_patches_nothing() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		image.write(0x2200).unwrap();
		image.write(0x2400).unwrap();
		table.define("NEAR", 0x3005).unwrap();
		table.record_usage("NEAR", Relocation::new(0x3000, 9, Mode::PcRelative, Some(1)));
		table.record_usage("MISSING", Relocation::new(0x3001, 9, Mode::PcRelative, Some(2)));

		assert!(table.link(&mut image).is_err());
		assert_eq!(image.get(0x3000), 0x2200);
		assert!(!table.is_linked());
	}

	#[test]
	fn test_offset_out_of_range() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		table.record_usage("FAR", Relocation::new(0x3000, 9, Mode::PcRelative, Some(1)));
		table.define("FAR", 0x3000 + 257).unwrap();

		let err = table.link(&mut image).unwrap_err();
		assert_eq!(err.kind, ErrorKind::OutOfRange);
		assert_eq!(err.line, Some(1));
	}

	#[test]
	fn test_offset_at_the_limits() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		table.record_usage("HIGH", Relocation::new(0x3000, 9, Mode::PcRelative, None));
		table.record_usage("LOW", Relocation::new(0x3100, 9, Mode::PcRelative, None));
		table.define("HIGH", 0x3000 + 256).unwrap();
		table.define("LOW", 0x3100 + 1 - 256).unwrap();

		table.link(&mut image).unwrap();
		assert_eq!(image.get(0x3000), 0x00FF);
		assert_eq!(image.get(0x3100), 0x0100);
	}

	#[test]
	fn test_link_only_once() {
		let mut image = MemoryImage::new(0x3000);
		let mut table = SymbolTable::new();

		table.link(&mut image).unwrap();
		assert!(table.is_linked());
		assert_eq!(table.link(&mut image).unwrap_err().kind, ErrorKind::Structural);
	}
}
