pub mod model;

pub use model::LoginSocial;
