pub mod accounts;
pub mod documents;
