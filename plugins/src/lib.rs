pub mod bridge;
pub mod factory;
pub mod toolchain;
