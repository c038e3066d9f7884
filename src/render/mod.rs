/// Parallel multi-scenario runs, selection and reset.
pub mod batch;
pub(crate) mod composite;
/// Composited output frames.
pub mod frame;
/// Per-scenario render pipeline.
pub mod pipeline;
