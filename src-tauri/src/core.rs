//! Domain logic, independent of the desktop shell

pub mod services;
