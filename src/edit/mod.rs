pub(crate) mod aggregate;
pub(crate) mod editor;
pub(crate) mod history;
pub(crate) mod stack;
