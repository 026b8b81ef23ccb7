pub mod aggregate;
pub mod effect_text;
pub mod error;
pub mod format;
pub mod icon;
pub mod slot;
