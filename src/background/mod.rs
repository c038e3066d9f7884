//! Full-frame backgrounds: cover fitting, still images, looping video beds.

pub(crate) mod fit;
pub(crate) mod track;
