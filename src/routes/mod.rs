pub mod health_check;
pub mod pages;
pub mod sites;
