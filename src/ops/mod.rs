pub mod item_ops;
pub mod share;
