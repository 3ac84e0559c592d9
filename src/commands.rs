pub(crate) mod evaluate;
pub(crate) mod predict;
