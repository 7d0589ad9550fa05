use derive_more::*;
use slotmap::new_key_type;

/// Engine-wide tile identifier.
/// Minted in increasing order and never reused, even after its tileset is unregistered.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Ord, PartialOrd, Display)]
#[display(fmt="#{_0}")]
pub struct GlobalTileHandle(pub(crate) u32);

impl GlobalTileHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

new_key_type! {
    /**
     * ID for a registered [`Tileset`](crate::Tileset).
     */
    pub struct TilesetHandle;
}
