pub mod measurement;
pub mod muscle_focus;
pub mod sanitize;
pub mod workout;
