//! Business logic services for the replenishment and approval workflow

pub mod approval;
pub mod history;
pub mod notification;
pub mod ordering;
pub mod supplier;

pub use approval::ApprovalService;
pub use history::HistoryService;
pub use notification::{NotificationDispatcher, NotificationEvent};
pub use ordering::OrderingService;
pub use supplier::SupplierService;
