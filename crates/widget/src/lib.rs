//! Embeddable quotation widget for the storefront.
//!
//! - **Remote data** (`remote`) - client/deposit lookups behind a mount,
//!   with stale-load protection
//! - **Form** (`form`) - draft editing, submission lifecycle, result
//!   modal
//! - **Flows** (`flows`) - the deposit and advisor wirings of the two
//!   coordinators
//! - **Router** (`router`) - role resolution and flow dispatch
//! - **Host** (`host`) - the mount registry and backend selection the
//!   storefront drives
//!
//! The host owns one `Arc<Services>` and hands it to every flow; nothing
//! in here reaches for a global.

pub mod flows;
pub mod form;
pub mod host;
pub mod remote;
pub mod router;

pub use flows::{AsesorFlow, DepositoFlow, FlowProps, FlowView};
pub use form::{ModalState, QuotationFormCoordinator, SubmissionState};
pub use host::{DebugInfo, HostProduct, HostQuotationData, MountHandle, WidgetContext};
pub use remote::{DepositOption, LoadState, RemoteDataCoordinator};
pub use router::{mount_flow, QuotationFlow};
