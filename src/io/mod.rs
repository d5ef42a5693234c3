pub(crate) mod document;
pub(crate) mod settings;
pub(crate) mod strokes;
