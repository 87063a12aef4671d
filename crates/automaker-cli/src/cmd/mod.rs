pub mod migrate;
pub mod paths;
pub mod serve;
pub mod settings;
pub mod status;
