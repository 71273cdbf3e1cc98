//! Order submission to the remote endpoint, with local fallback.

mod endpoint;
pub(crate) mod payload;
mod service;

pub use endpoint::{DispatchError, FormEndpointClient, MockOrderDispatcher, OrderDispatcher};
pub use payload::{FormspreeForm, OrderSubmission};
pub use service::{OrderSubmissionService, RetryPolicy};
