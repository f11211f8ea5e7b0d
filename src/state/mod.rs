pub mod gesture;
pub mod viewport;

pub use gesture::{GestureController, GestureOutcome, GesturePhase, GestureSession};
pub use viewport::{EdgeRoom, ViewportController, ViewportPhase};
