pub(crate) mod background_fit;
pub(crate) mod engine;
pub(crate) mod reducer;
