//! Domain primitives, services, and ports.
//!
//! Purpose: hold the transport-agnostic core of route optimisation. Inbound
//! adapters call the driving ports in [`ports`]; outbound adapters implement
//! the driven ones.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Stop, StopId, RouteId — validated request inputs.
//! - OptimizationRequest, OptimizedResult — optimiser input and output.
//! - RouteOptimizerService — cache-aware optimisation orchestrator.
//! - RoutePlanOptimizationService — optimisation of stored route plans.

pub mod error;
pub mod geo;
pub mod optimization;
pub mod ports;
pub mod route_id;
pub mod route_optimizer;
pub mod route_plan_service;
pub mod stop;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{Coordinate, GeoPoint};
pub use self::optimization::{
    OptimizationRequest, OptimizedResult, ReconstructionError, ResultSource, RouteEndpoints,
    RouteOptimizationError, RouteSummary, SequencedStop, StopEtas, StopsFingerprint,
    cumulative_etas, reconstruct_visit_order,
};
pub use self::route_id::{RouteId, RouteIdValidationError};
pub use self::route_optimizer::{
    DEFAULT_FRESHNESS_WINDOW, DEFAULT_PROVIDER_TIMEOUT, OptimizationPolicy, RouteOptimizerService,
    is_fresh,
};
pub use self::route_plan_service::{RoutePlanOptimizationService, schedule_from};
pub use self::stop::{Stop, StopId, StopIdValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use route_optimizer::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::invalid_request("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
