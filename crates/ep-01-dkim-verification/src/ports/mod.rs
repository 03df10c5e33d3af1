//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that external callers use
//! - **Outbound (Driven)**: Key lookup capabilities this subsystem needs

pub mod inbound;
pub mod outbound;
