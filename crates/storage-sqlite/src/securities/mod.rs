mod model;
mod repository;

pub use repository::SqlitePriceStore;

#[cfg(test)]
mod repository_test;
