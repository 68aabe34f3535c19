//! Concrete protocol requests.
//!
//! Each request plugs into [`ServiceRequest`](crate::request::ServiceRequest)
//! and owns nothing but its parameters and wire names.

mod delete_item;
mod diagnostic;


pub use self::delete_item::{
    AffectedTaskOccurrence, DeleteItemRequest, DeleteMode, ItemId, SendCancellationsMode,
};
pub use self::diagnostic::{DiagnosticResult, ExecuteDiagnosticMethodRequest};
