//! `selfrun-glue` subcommands.

pub mod extract;
pub mod glue;
pub mod inspect;
