pub(crate) mod ink_session;
pub(crate) mod sink;
