pub(crate) mod align;
pub(crate) mod materialize;
pub(crate) mod spec;
