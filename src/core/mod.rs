pub mod components;
pub mod execution;
pub mod metrics;
pub mod production;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;
