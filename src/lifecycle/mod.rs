pub mod controller;
pub mod signals;

pub use controller::{
    HangupAction, LifecycleCommand, LifecycleController, LifecycleSignal, LifecycleState,
};
pub use signals::spawn_signal_listener;
