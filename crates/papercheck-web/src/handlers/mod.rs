pub mod correct;
pub mod sign;
pub mod validate;
