pub(crate) mod common;
mod intake;
