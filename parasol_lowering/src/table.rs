use parasol_hlfhe::Attribute;

use crate::{
    Error, LookupTable, Result,
    constant::{NativeDenseBuilder, TensorLiteralBuilder},
};

/// The element width of encoded tables.
pub const TABLE_ELEMENT_WIDTH: u32 = 64;

/// Encode `table` as a 1-D tensor literal of [`TABLE_ELEMENT_WIDTH`]-bit elements.
pub fn encode_table(table: &LookupTable) -> Result<Attribute> {
    NativeDenseBuilder.build(&[table.len()], TABLE_ELEMENT_WIDTH, table.entries())
}

/// Check `table` has exactly one entry per `bit_width`-bit input.
pub fn check_table_domain(table: &LookupTable, bit_width: u32) -> Result<()> {
    let len = table.len();

    if len.is_power_of_two() && len.trailing_zeros() == bit_width {
        Ok(())
    } else {
        Err(Error::TableDomain { bit_width, len })
    }
}
