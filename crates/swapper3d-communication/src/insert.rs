//! Insert selection
//!
//! The panel numbers inserts from 1; the wire protocol numbers them from 0.

use swapper3d_core::{PanelError, PanelResult};

pub struct InsertSelector;

impl InsertSelector {
    /// Turn a user-facing insert identifier into a wire index
    ///
    /// Only checks that the value is a base-10 integer. `"0"` yields `-1`;
    /// range checking belongs to the device.
    pub fn select_insert(raw: &str) -> PanelResult<i32> {
        let value: i32 = raw
            .trim()
            .parse()
            .map_err(|_| PanelError::InvalidInsertIdentifier {
                raw: raw.to_string(),
            })?;
        value
            .checked_sub(1)
            .ok_or_else(|| PanelError::InvalidInsertIdentifier {
                raw: raw.to_string(),
            })
    }
}
