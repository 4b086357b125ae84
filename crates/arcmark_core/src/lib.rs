pub mod export;
pub mod files;
pub mod html;
pub mod sidebar;
pub mod tree;
