//! Installed apps

pub mod polls;
