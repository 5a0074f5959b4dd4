pub(crate) mod batch;
pub(crate) mod emit;
pub(crate) mod face;
pub(crate) mod scene;
