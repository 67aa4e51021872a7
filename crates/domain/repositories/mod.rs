pub mod attendance;
pub mod bookkeeping;
pub mod faqs;
pub mod gateway_orders;
pub mod gym_subscriptions;
pub mod gyms;
pub mod member_billing;
pub mod members;
pub mod membership_plans;
pub mod notifications;
pub mod saas_plans;
pub mod staff;
pub mod support_tickets;
pub mod webhook_events;
