pub mod renderer;

pub use renderer::{RenderOptions, Renderer};
