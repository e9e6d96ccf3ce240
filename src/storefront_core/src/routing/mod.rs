pub mod guard;
pub mod route_table;
