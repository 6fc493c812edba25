pub mod customization;
pub mod resume;
