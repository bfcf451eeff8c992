pub(crate) mod batch;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod host;
pub(crate) mod offscreen;
pub(crate) mod overlay;
