pub(crate) mod extract;
pub(crate) mod indexer;
pub(crate) mod number;
