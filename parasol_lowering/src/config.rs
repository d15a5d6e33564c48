use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Options controlling how a program is lowered.
pub struct LoweringOptions {
    /// The name of the emitted function.
    pub function_name: String,

    /// Verify each lookup table has `2^N` entries for its `N`-bit input.
    ///
    /// # Remarks
    /// Front ends establish this when they build tables, so it's off by default.
    pub check_table_domain: bool,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            function_name: "main".to_owned(),
            check_table_domain: false,
        }
    }
}

impl LoweringOptions {
    /// Parse options from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
