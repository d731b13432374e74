pub mod natural;
pub mod validation;
