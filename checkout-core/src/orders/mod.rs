//! Order command processing
//!
//! Per-command action handlers over a borrowed [`CommandContext`], the
//! order-status and payment-transaction state machines, and the
//! [`workflow::OrderWorkflow`] facade that wires them together.
//!
//! # Data Flow
//!
//! 1. Caller invokes a workflow method (place, capture, cancel, ...)
//! 2. The workflow builds the matching action and a `CommandContext`
//! 3. The action validates, calls collaborators, persists mutations
//! 4. Every mutation re-runs `check_order_status` as a consistency check
//! 5. Lifecycle signals are broadcast to all subscribers

pub mod actions;
pub mod context;
pub mod items;
pub mod predicates;
pub mod status;
pub mod workflow;

pub use context::{CommandContext, CommandHandler, Services};
pub use status::{check_order_status, process_order_paid, set_order_status};
pub use workflow::OrderWorkflow;
