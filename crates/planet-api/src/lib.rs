// planet-api: Async Rust client for PLANET managed switch web management

pub mod client;
pub mod codec;
pub mod cookies;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod session;
pub mod transport;

pub use client::PlanetClient;
pub use device::{DEFAULT_TIMEOUT, Device, DeviceKey, DeviceProfile};
pub use diagnostics::{DiagnosticSink, Diagnostics};
pub use error::{ConnectionErrorKind, Error};
pub use session::{SessionPhase, SessionStore};
pub use transport::{DeviceRequest, HeaderProfile, Query, TransportConfig};
