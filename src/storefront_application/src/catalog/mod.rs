pub mod catalog_client;
pub mod product_browser;
