pub mod dex_config;

pub use dex_config::{DexConfigRoot, DexConfigSection};
