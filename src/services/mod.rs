pub mod export;
pub mod ledger;
pub mod scan;
pub mod students;
