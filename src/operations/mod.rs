pub mod add;
pub mod aggregate;
pub mod budget;
pub mod dashboard;
pub mod extract;
pub mod import;
pub mod ledger;
pub mod manage;
pub mod normalize;
pub mod reconcile;
