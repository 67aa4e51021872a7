pub mod expense_categories;
pub mod invoice_statuses;
pub mod member_statuses;
pub mod notification_kinds;
pub mod order_kinds;
pub mod order_statuses;
pub mod payment_methods;
pub mod roles;
pub mod staff_positions;
pub mod subscription_statuses;
pub mod ticket_priorities;
pub mod ticket_statuses;
