pub mod camera;
pub mod config;
pub mod face;
pub mod frame_loop;
pub mod projection;
pub mod render;
pub mod sampler;
pub mod tracker;
pub mod viewer;
