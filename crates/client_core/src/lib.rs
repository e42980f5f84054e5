//! Client side of the lead enrichment tool: the session provider seam, the
//! enrichment HTTP client, and the view controller that sequences them.

pub mod controller;
pub mod enrichment;
pub mod error;
pub mod session;

pub use controller::{
    spawn as spawn_controller,
    state::{Effect, Event, FormInput, Phase, ViewState},
    ControllerHandle,
};
pub use enrichment::{Enricher, HttpEnrichmentClient};
pub use error::{ControllerError, EnrichError, SessionError};
pub use session::{LocalSessionProvider, SessionProvider};
