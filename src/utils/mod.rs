pub mod logging;
pub mod screenshot;
