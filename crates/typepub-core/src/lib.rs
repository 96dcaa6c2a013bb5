#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod generate;
pub mod paths;
pub mod typings;
pub mod version;

pub use config::{Config, GenerateOptions};
pub use error::Error;
pub use generate::{GenError, GenerateLog, Generator, License};
pub use typings::{
    AnyPackage, NotNeededPackage, PackageIndex, PackageSet, TypingPackage, Version,
    VersionResolver, VersionTable,
};
pub use version::VERSION;
