//! Print backends, one per printer kind

pub(crate) mod mock;
pub(crate) mod serial;
pub(crate) mod system;
mod transport;

pub use mock::{MockJob, MockPrinter};
pub use serial::SerialBackend;
pub use system::SystemBackend;
pub use transport::{SerialTransport, ThermalTransport};
