pub mod detector_pool;
pub mod locator_builder;
