pub mod energy;
pub mod netbilling;
pub mod tariff;
