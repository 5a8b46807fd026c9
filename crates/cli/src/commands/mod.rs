pub(crate) mod migrate;
pub(crate) mod queue;
pub(crate) mod serve;
