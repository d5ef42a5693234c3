pub(crate) mod layer;
pub(crate) mod stroke;
