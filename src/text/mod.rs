//! Text and emoji overlays.

pub(crate) mod fonts;
pub(crate) mod layout;
pub(crate) mod overlay;
pub(crate) mod segment;
pub(crate) mod wrap;
