pub mod backdrop;
pub mod pages;

pub use backdrop::{BackgroundLayer, NeuralBackground, SimpleNetwork};
pub use pages::{HomePage, NotFoundPage};
