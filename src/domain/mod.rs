mod city_name;
mod email_address;
mod email_template;
mod frequency;

pub use city_name::CityName;
pub use email_address::EmailAddress;
pub use email_template::{EmailTemplate, EmailTemplates};
pub use frequency::Frequency;
