pub mod design;
pub mod encode;
pub mod reinsert;
pub mod select;
