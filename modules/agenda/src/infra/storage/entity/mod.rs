pub mod hobby;
pub mod person;
pub mod person_hobby;
pub mod reunion;
