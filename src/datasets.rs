pub(crate) mod assembly;
pub(crate) mod records;
