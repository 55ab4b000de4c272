pub mod work_orders;
