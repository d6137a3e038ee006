pub mod text;
pub(crate) mod time;
