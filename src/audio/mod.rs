pub(crate) mod mix;
pub(crate) mod narration;
pub(crate) mod process;
