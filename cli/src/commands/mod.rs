pub mod cli;
pub mod inspect;
pub mod serve;
pub mod toolchain;
