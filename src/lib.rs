//! Silica - silica concentrate prediction for iron ore flotation.
//!
//! Silica predicts the silica concentrate percentage of a flotation process
//! from three operator-entered parameters: iron concentrate (%), flotation
//! column 01 air flow, and amine reagent flow. A pre-trained regression
//! artifact is loaded once per process and invoked per explicit submit.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Silica                           │
//! ├─────────────────────────────────────────────────────────┤
//! │  Console Front End: controls | submit | rendered output │
//! ├─────────────────────────────────────────────────────────┤
//! │  Session: bounded controls | state machine | formatting │
//! ├─────────────────────────────────────────────────────────┤
//! │  Prediction Service: feature row | inference | stats    │
//! ├─────────────────────────────────────────────────────────┤
//! │  Model Loader: load-once cache | single-flight | schema │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use silica::app::{Session, SessionState};
//! use silica::config::SilicaConfig;
//!
//! #[tokio::main]
//! async fn main() -> silica::Result<()> {
//!     let config = SilicaConfig::development();
//!     let mut session = Session::new(config);
//!
//!     session.set_air(210.0)?;
//!     if let SessionState::DisplayResult(pct) = session.submit().await {
//!         println!("Predicted silica concentrate: {}", pct);
//!     }
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod observability;

pub use error::{LoadError, PredictError, Result, SilicaError};
