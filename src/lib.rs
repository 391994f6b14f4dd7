pub mod catalog;
pub mod config;
pub mod fetch;
pub mod page;
pub mod server;
pub mod table;

#[cfg(test)]
mod test_support;
