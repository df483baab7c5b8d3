//! Sortscope Player
//!
//! Plays a step sequence back under a cooperative timer:
//!
//! - `PlaybackController` - synchronous state machine over the sequence store
//! - `StepPacer` - turns a speed multiplier into the inter-step delay
//! - `PlaybackDriver` - async task owning the controller and its timer loop
//! - `PlayerHandle` - cloneable control surface for callers
//!
//! # Example
//!
//! ```ignore
//! use sortscope_player::{spawn_player, PlaybackConfig, PlayerEvent};
//!
//! let (player, mut events) = spawn_player(PlaybackConfig::default().with_speed(2.0));
//! player.run(&service, &request).await?;
//! player.start()?;
//!
//! while let Some(event) = events.recv().await {
//!     if let PlayerEvent::StepActivated(step) = event {
//!         // Redraw bars...
//!     }
//! }
//! ```

mod controller;
mod driver;
mod pacer;

pub use controller::{PlaybackConfig, PlaybackController, PlaybackMode, Tick};
pub use driver::{spawn_player, PlaybackDriver, PlayerEvent, PlayerHandle, PlayerStatus};
pub use pacer::{StepPacer, MAX_SPEED, MIN_SPEED};
