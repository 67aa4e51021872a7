pub mod attendance;
pub mod bookkeeping;
pub mod enums;
pub mod faqs;
pub mod gyms;
pub mod member_billing;
pub mod members;
pub mod membership_plans;
pub mod notifications;
pub mod proration;
pub mod saas_plans;
pub mod staff;
pub mod subscriptions;
pub mod support_tickets;
