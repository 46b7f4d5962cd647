pub mod completion_api;
pub mod insight;
pub mod order_detail;
pub mod order_list;
