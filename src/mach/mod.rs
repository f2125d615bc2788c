/*!
## Machine Module

This module validates and executes parsed PixelWalle programs against a
raster canvas: semantic analysis, execution state, the tree-walking
interpreter and the canvas engine.

*/

mod analyze;
mod canvas;
mod function;
mod interp;
mod state;
mod val;

pub use analyze::analyze;
pub use canvas::Canvas;
pub use canvas::Rgba;
pub use function::signature;
pub use function::return_type;
pub use interp::execute;
pub use interp::UNBOUNDED;
pub use state::State;
pub use val::Type;
pub use val::Val;
