// HTTP handlers

pub mod deploy;

pub use deploy::relay_deploy;
