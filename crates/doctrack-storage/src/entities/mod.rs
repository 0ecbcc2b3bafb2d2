pub mod activity_log;
pub mod document;
pub mod ewp_record;
pub mod leave_request;
pub mod notification;
pub mod sla_preference;
pub mod user;
