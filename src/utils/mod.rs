pub mod jwt;
pub mod password;
pub mod rango;
pub mod signature;
pub mod transitions;
pub mod validation;
