//! Project and render configuration loaded from YAML.

pub(crate) mod model;
pub(crate) mod project;
