pub mod scenarios;
pub mod simulate;
pub mod tariff;
