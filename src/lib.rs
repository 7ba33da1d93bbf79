#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

extern crate simplelog;

//Application Imports/Exports
pub mod constants;
pub mod engine;
