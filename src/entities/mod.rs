pub mod bom;
pub mod bom_line;
pub mod item;
pub mod production_order;
pub mod routing;
pub mod routing_operation;
pub mod work_center;
pub mod work_order;
pub mod work_order_operation;
