pub mod fill;
pub mod template;
