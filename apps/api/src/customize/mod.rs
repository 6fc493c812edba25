// Customization layer: user choices become ordered operations applied to a source buffer.
pub mod color;
pub mod customizer;
pub mod ops;
