pub mod production_order;
