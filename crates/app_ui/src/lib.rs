//! Image Gallery UI Layer
//!
//! Provides:
//! - egui-based gallery components
//! - wgpu rendering pipeline
//! - Input handling
//! - Texture cache for loaded images

pub mod renderer;
pub mod components;
pub mod input;
pub mod textures;
pub mod theme;

pub use renderer::Renderer;
pub use input::InputHandler;
pub use textures::TextureCache;
pub use theme::Theme;
