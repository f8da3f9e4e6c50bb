//! Financial concepts core: lifecycle, versioning, and query engine.
//!
//! A *concept* is a billable or penalizing line item definition (a fee,
//! a fine, or a miscellaneous charge) for a property or condominium. This
//! crate owns the concept data model and the rules around it:
//!
//! - [`normalize`]: canonical calculation and scope records
//! - [`lifecycle`]: status transitions and scheduled-version promotion
//! - [`query`]: filtering and pagination
//! - [`repository`]: the owned in-memory collection and its operations
//! - [`service`]: async facade with simulated round-trip latency
//! - [`view`]: consumer-side list state with an in-flight guard

pub mod boundary;
pub mod clock;
pub mod exit_codes;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod payload;
pub mod query;
pub mod repository;
pub mod script;
pub mod seed;
pub mod service;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fc_common::{ConceptCode, ConceptId, Error, Result};
pub use model::{
    AppliesTo, Audit, Calculation, CalculationMethod, Concept, ConceptStatus, ConceptType,
    PendingVersion, Periodicity, Scope, VersionWindow, Versioning,
};
pub use payload::{CreateConcept, ScheduleVersion, UpdateConcept};
pub use query::{ConceptFilter, ConceptPage, ListQuery, ListResponse};
pub use repository::ConceptRepository;
pub use service::ConceptService;
pub use view::{ConceptListView, ViewSnapshot};
