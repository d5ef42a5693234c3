pub(crate) mod cache;
pub(crate) mod compositor;
pub(crate) mod cpu;
pub(crate) mod export;
pub(crate) mod geometry;
pub(crate) mod reveal;
pub(crate) mod style;
