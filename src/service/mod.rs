//! Service layer: the engine's six components.
//!
//! [`RsvpLedger`] owns the registration lifecycle, [`WaitlistPromoter`]
//! fills freed capacity, [`TicketIssuer`] and [`TicketValidator`] turn
//! confirmed RSVPs into scannable tickets and back, and
//! [`AttendanceRecorder`] commits check-ins atomically.
//! [`MetricsAggregator`] keeps the event counters consistent with every
//! mutation. All of them emit events through the
//! [`crate::domain::EventBus`].

pub mod issuer;
pub mod ledger;
pub mod metrics;
pub mod promoter;
pub mod recorder;
pub mod validator;

pub use issuer::TicketIssuer;
pub use ledger::RsvpLedger;
pub use metrics::MetricsAggregator;
pub use promoter::WaitlistPromoter;
pub use recorder::AttendanceRecorder;
pub use validator::TicketValidator;
