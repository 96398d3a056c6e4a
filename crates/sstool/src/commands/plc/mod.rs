use clap::Args;
use miette::{miette, Result};
use ss_plc::{Attribute, BitField};

pub mod attributes;
pub mod check;
pub mod dump;
pub mod modify;

#[derive(clap::Subcommand)]
pub enum PlcCommands {
    /// List record tables holding a value
    Check(check::CheckArgs),
    /// Write a value into the record tables of an archive
    Modify(modify::ModifyArgs),
    /// Print the records of a table
    Dump(dump::DumpArgs),
    /// List the known attributes
    Attributes(attributes::AttributesArgs),
}

impl PlcCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            PlcCommands::Check(check) => check.handle(),
            PlcCommands::Modify(modify) => modify.handle(),
            PlcCommands::Dump(dump) => dump.handle(),
            PlcCommands::Attributes(attributes) => attributes.handle(),
        }
    }
}

/// Parses a hexadecimal number, with or without a `0x` prefix
pub fn parse_hex(s: &str) -> core::result::Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("{s} is not a hexadecimal number: {e}"))
}

/// The bit-field to look for or write, given either by position or by attribute name
#[derive(Args, Debug)]
pub struct FieldArgs {
    /// Index of the code inside each record, 0 to 4
    #[arg(short, long, required_unless_present = "attribute", conflicts_with = "attribute")]
    code: Option<usize>,

    /// Mask of the field, in hexadecimal
    #[arg(short, long, value_parser = parse_hex, required_unless_present = "attribute", conflicts_with = "attribute")]
    mask: Option<u32>,

    /// Position of the lowest bit of the field
    #[arg(short, long, required_unless_present = "attribute", conflicts_with = "attribute")]
    shift: Option<u32>,

    /// Value of the field, in hexadecimal
    #[arg(short, long, value_parser = parse_hex)]
    value: u32,

    /// Name of a known attribute, instead of code, mask and shift
    #[arg(long, value_name = "NAME")]
    attribute: Option<String>,
}

impl FieldArgs {
    pub fn field(&self) -> Result<BitField> {
        match (&self.attribute, self.code, self.mask, self.shift) {
            (Some(name), ..) => {
                let field = Attribute::by_name(name)?.with_value(self.value);
                field.validate()?;
                Ok(field)
            }
            (None, Some(code), Some(mask), Some(shift)) => {
                Ok(BitField::new(code, shift, mask, self.value)?)
            }
            _ => Err(miette!("either --attribute or all of --code, --mask and --shift are needed")),
        }
    }
}
