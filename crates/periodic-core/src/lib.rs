pub mod camera;
pub mod color;
pub mod constants;
pub mod controls;
pub mod element;
pub mod envelope;
pub mod layout;
pub mod picking;
pub mod player;
pub mod scene;
pub mod scheduler;
pub mod sequence;
pub mod tone;
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use camera::*;
pub use color::*;
pub use constants::*;
pub use controls::*;
pub use element::*;
pub use envelope::*;
pub use layout::*;
pub use picking::*;
pub use player::*;
pub use scene::*;
pub use scheduler::*;
pub use sequence::*;
pub use tone::*;
