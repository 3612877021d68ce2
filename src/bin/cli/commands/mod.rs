pub mod review;
pub mod settings;
pub mod tags;
pub mod words;
