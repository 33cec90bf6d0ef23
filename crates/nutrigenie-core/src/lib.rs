pub mod calories;
pub mod prompt;
pub mod sections;

pub use calories::{ActivityLevel, Profile, Sex, daily_calories};
pub use sections::{Section, SectionedResponse, sectioned_response};
