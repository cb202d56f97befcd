pub mod whoami;

pub use whoami::get as whoami_get;
