pub mod attendance;
pub mod bookkeeping;
pub mod faqs;
pub mod gyms;
pub mod member_billing;
pub mod members;
pub mod membership_plans;
pub mod notifications;
pub mod saas;
pub mod staff;
pub mod support_tickets;
