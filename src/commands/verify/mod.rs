mod coverage;
mod numeric;
mod report;
mod run;
mod schema;
mod structure;

pub use run::run;
